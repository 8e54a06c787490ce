pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "paynet")]
#[command(about = "PayNet CLI - partner levels, commission cascades, list views and account administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Backend base URL (defaults to PAYNET_BACKEND_URL)")]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign-in identity management")]
    Session {
        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },

    #[command(about = "Partner level configuration")]
    Level {
        #[command(subcommand)]
        cmd: commands::level::LevelCommands,
    },

    #[command(about = "Merchant commission cascades")]
    Commission {
        #[command(subcommand)]
        cmd: commands::commission::CommissionCommands,
    },

    #[command(about = "Paginated list views")]
    List {
        #[command(subcommand)]
        cmd: commands::list::ListCommands,
    },

    #[command(about = "Payment history actions")]
    Payment {
        #[command(subcommand)]
        cmd: commands::payment::PaymentCommands,
    },

    #[command(about = "Partner and store registration and account edits")]
    Account {
        #[command(subcommand)]
        cmd: commands::account::AccountCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Session { cmd } => commands::session::handle(cmd, output_format).await,
        Commands::Level { cmd } => commands::level::handle(cmd, output_format, cli.backend).await,
        Commands::Commission { cmd } => commands::commission::handle(cmd, output_format, cli.backend).await,
        Commands::List { cmd } => commands::list::handle(cmd, output_format, cli.backend).await,
        Commands::Payment { cmd } => commands::payment::handle(cmd, output_format, cli.backend).await,
        Commands::Account { cmd } => commands::account::handle(cmd, output_format, cli.backend).await,
    }
}
