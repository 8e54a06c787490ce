use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::cli::config::{api_client, load_session};
use crate::cli::utils::{output_data, output_empty_collection, output_success, print_table, ConsoleNotifier};
use crate::cli::OutputFormat;
use crate::commission::{format_commission, CascadeStatus, CommissionBoard};
use crate::config::config;
use crate::listing::SearchParams;

#[derive(Subcommand)]
pub enum CommissionCommands {
    #[command(about = "List merchant commission cascades")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value = "", help = "Search column")]
        select: String,
        #[arg(long, default_value = "", help = "Search text")]
        search: String,
    },

    #[command(about = "Check a merchant's cascade, optionally with new tier values")]
    Check {
        #[arg(help = "Merchant id")]
        id: String,
        #[arg(long, value_delimiter = ',', help = "Tier values from the top, comma separated")]
        tiers: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    #[command(about = "Save new tier and terminal values for a merchant")]
    Save {
        #[arg(help = "Merchant id")]
        id: String,
        #[arg(long, value_delimiter = ',', help = "Tier values from the top, comma separated")]
        tiers: Vec<String>,
        #[arg(long, help = "Merchant terminal commission")]
        terminal: Option<String>,
        #[arg(long, default_value_t = 1, help = "Page the merchant is listed on")]
        page: u32,
    },
}

pub async fn handle(cmd: CommissionCommands, output_format: OutputFormat, backend: Option<String>) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = api_client(backend.as_deref())?;
    let console = &config().console;
    let mut board = CommissionBoard::new(
        client,
        session,
        Arc::new(ConsoleNotifier),
        console.commission_page_size,
        console.saved_indicator(),
    );

    match cmd {
        CommissionCommands::List { page, select, search } => {
            let mut params = SearchParams::new(select);
            params.text = search;
            board.load(page, params).await?;

            if board.merchants().is_empty() {
                return output_empty_collection(&output_format, "merchants", "No merchants found");
            }

            let pagination = board.pagination();
            output_data(&output_format, "merchants", &board.merchants(), |merchants| {
                let table: Vec<Vec<String>> = merchants
                    .iter()
                    .map(|m| {
                        let check = m.check();
                        vec![
                            m.id.clone(),
                            m.name.clone(),
                            format_commission(m.total_commission),
                            m.tiers
                                .iter()
                                .map(|t| format!("{}={}", t.name, format_commission(t.commission)))
                                .collect::<Vec<_>>()
                                .join(" "),
                            format_commission(m.merchant_commission),
                            status_label(&check.status),
                        ]
                    })
                    .collect();
                print_table(&["ID", "MERCHANT", "TOTAL", "TIERS", "TERMINAL", "STATUS"], &table);
                println!(
                    "Page {}/{} ({} merchants)",
                    pagination.current_page, pagination.total_pages, pagination.total_count
                );
            })
        }
        CommissionCommands::Check { id, tiers, page } => {
            board.load(page, SearchParams::default()).await?;
            for (index, value) in tiers.iter().enumerate() {
                board.set_tier_input(&id, index, value)?;
            }

            let check = board.check(&id)?;
            output_data(&output_format, "check", &check, |c| {
                println!(
                    "Sum {} of {}: {}",
                    format_commission(c.sum),
                    format_commission(c.total),
                    status_label(&c.status)
                );
            })
        }
        CommissionCommands::Save { id, tiers, terminal, page } => {
            board.load(page, SearchParams::default()).await?;
            for (index, value) in tiers.iter().enumerate() {
                board.set_tier_input(&id, index, value)?;
            }
            if let Some(terminal) = terminal {
                board.set_terminal_input(&id, &terminal)?;
            }

            let draft = board.draft(&id).cloned();
            board.save(&id).await?;
            output_success(
                &output_format,
                &format!("Saved commission for merchant {}", id),
                Some(json!({ "draft": draft })),
            )
        }
    }
}

fn status_label(status: &CascadeStatus) -> String {
    match status {
        CascadeStatus::Balanced => "balanced".to_string(),
        CascadeStatus::Over(excess) => format!("over by {}", format_commission(*excess)),
        CascadeStatus::Under(shortfall) => format!("under by {}", format_commission(*shortfall)),
        CascadeStatus::Unallocated => "unallocated".to_string(),
    }
}
