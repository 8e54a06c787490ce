use clap::Subcommand;
use serde_json::json;

use crate::cli::config::session_store;
use crate::cli::utils::{output_data, output_success};
use crate::cli::OutputFormat;
use crate::session::Session;
use crate::types::{Classify, Rate};

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Store the identity values issued at sign-in")]
    Login {
        #[arg(help = "User id")]
        user_id: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Account classification: admin, partner or store (or 0/1/2)")]
        classify: Classify,
        #[arg(long, help = "Partner tier code, e.g. p2")]
        rate: Option<Rate>,
        #[arg(long, help = "Partner/store code")]
        code: Option<String>,
    },

    #[command(about = "Show the stored session")]
    Show,

    #[command(about = "Forget the stored session")]
    Logout,
}

pub async fn handle(cmd: SessionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = session_store()?;

    match cmd {
        SessionCommands::Login { user_id, name, classify, rate, code } => {
            let mut session = Session::new(classify, rate, user_id, name);
            if let Some(code) = code {
                session = session.with_user_code(code);
            }
            store.save(&session)?;
            tracing::info!("Session stored at {}", store.path().display());

            output_success(
                &output_format,
                &format!("Signed in as {}", session.user_name.as_deref().unwrap_or_default()),
                Some(json!({ "session": session })),
            )
        }
        SessionCommands::Show => {
            let session = store.load()?;
            output_data(&output_format, "session", &session, |s| {
                if !s.is_authenticated() {
                    println!("Not signed in");
                    return;
                }
                println!("User:     {} ({})", s.user_name.as_deref().unwrap_or("-"), s.user_id.as_deref().unwrap_or("-"));
                println!("Classify: {}", s.classify.map(|c| c.label()).unwrap_or("-"));
                println!("Rate:     {}", s.rate.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()));
                println!("Code:     {}", s.user_code.as_deref().unwrap_or("-"));
            })
        }
        SessionCommands::Logout => {
            store.clear()?;
            output_success(&output_format, "Signed out", None)
        }
    }
}
