use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::cli::config::{api_client, load_session};
use crate::cli::utils::{output_success, ConsoleNotifier};
use crate::cli::OutputFormat;
use crate::confirm::{Confirm, FixedAnswer, TerminalPrompt};
use crate::payment::{CancelOutcome, CancelTarget, PaymentCanceller, APPROVED_STATE};

#[derive(Subcommand)]
pub enum PaymentCommands {
    #[command(about = "Cancel an approved key-in (type 1) or 3-D Secure (type 4) payment")]
    Cancel {
        #[arg(help = "Track id of the payment")]
        track_id: String,
        #[arg(long, help = "pay_type of the payment row")]
        pay_type: String,
        #[arg(long, default_value = APPROVED_STATE, help = "cancelYN of the payment row")]
        cancel_state: String,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle(cmd: PaymentCommands, output_format: OutputFormat, backend: Option<String>) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = api_client(backend.as_deref())?;
    let canceller = PaymentCanceller::new(client, session, Arc::new(ConsoleNotifier));

    match cmd {
        PaymentCommands::Cancel { track_id, pay_type, cancel_state, yes } => {
            let confirm: Box<dyn Confirm> = if yes { Box::new(FixedAnswer(true)) } else { Box::new(TerminalPrompt) };
            let target = CancelTarget { track_id, pay_type, cancel_state };
            match canceller.cancel(&target, confirm.as_ref()).await? {
                CancelOutcome::Cancelled(message) => output_success(
                    &output_format,
                    &format!("Cancelled payment {}", target.track_id),
                    Some(json!({ "track_id": target.track_id, "server_message": message })),
                ),
                CancelOutcome::Declined => output_success(&output_format, "Cancelled", None),
            }
        }
    }
}
