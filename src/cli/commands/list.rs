use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;

use crate::api::{EndpointSource, ListEndpoint, LogKind};
use crate::cli::config::{api_client, load_session};
use crate::cli::utils::{output_data, output_empty_collection};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::listing::{ListData, PageWindow, SearchParams};

#[derive(Subcommand)]
pub enum ListCommands {
    #[command(about = "Merchant stores")]
    Stores(ListArgs),

    #[command(about = "Partners")]
    Partners(ListArgs),

    #[command(about = "Audit logs")]
    Logs {
        #[arg(value_enum)]
        kind: LogArg,
        #[command(flatten)]
        args: ListArgs,
    },

    #[command(about = "Terminal payments")]
    Payments(ListArgs),

    #[command(about = "Terminal sales")]
    Sales(ListArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogArg {
    Login,
    Edit,
    StoreCommission,
    StoreSettlement,
}

impl From<LogArg> for LogKind {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::Login => LogKind::Login,
            LogArg::Edit => LogKind::Edit,
            LogArg::StoreCommission => LogKind::StoreCommission,
            LogArg::StoreSettlement => LogKind::StoreSettlement,
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, help = "Rows per page (defaults to the console setting)")]
    pub page_size: Option<u32>,
    #[arg(long, help = "Search column")]
    pub select: Option<String>,
    #[arg(long, default_value = "", help = "Search text")]
    pub search: String,
    #[arg(long, help = "Start date, YYYY-MM-DD")]
    pub from: Option<NaiveDate>,
    #[arg(long, help = "End date, YYYY-MM-DD")]
    pub to: Option<NaiveDate>,
    #[arg(long = "filter", value_parser = parse_filter, help = "Extra selector as key=value")]
    pub filters: Vec<(String, String)>,
}

impl ListArgs {
    fn search_params(&self, endpoint: ListEndpoint) -> SearchParams {
        let mut params = SearchParams::new(self.select.clone().unwrap_or_else(|| endpoint.default_select().to_string()));
        params.text = self.search.clone();
        params.start_date = self.from;
        params.end_date = self.to;
        params.filters = self.filters.iter().cloned().collect();
        params
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("filter '{}' must look like key=value", raw))
}

pub async fn handle(cmd: ListCommands, output_format: OutputFormat, backend: Option<String>) -> anyhow::Result<()> {
    let (endpoint, args) = match cmd {
        ListCommands::Stores(args) => (ListEndpoint::Stores, args),
        ListCommands::Partners(args) => (ListEndpoint::Partners, args),
        ListCommands::Logs { kind, args } => (ListEndpoint::Logs(kind.into()), args),
        ListCommands::Payments(args) => (ListEndpoint::Payments, args),
        ListCommands::Sales(args) => (ListEndpoint::Sales, args),
    };

    let session = load_session()?;
    let client = api_client(backend.as_deref())?;
    let console = &config().console;

    let list = ListData::new(
        EndpointSource::<Value>::new(client, endpoint, session),
        args.search_params(endpoint),
        args.page_size.unwrap_or(console.default_page_size),
        console.search_debounce(),
    );
    tracing::debug!("Listing {} page {}", endpoint, args.page);
    list.change_page(args.page).await?;

    let state = list.snapshot().await;
    list.destroy();

    if state.items.is_empty() {
        return output_empty_collection(&output_format, "items", "No rows found");
    }

    output_data(&output_format, "list", &state, |state| {
        for item in &state.items {
            println!("{}", item);
        }
        let p = state.pagination;
        let window = PageWindow::block(p.current_page, p.total_pages);
        println!(
            "Page {}/{} ({} rows), pages {}-{}",
            p.current_page, p.total_pages, p.total_count, window.start, window.end
        );
        if !state.stats.is_empty() {
            println!("Totals: {}", Value::Object(state.stats.clone().into_iter().collect()));
        }
    })
}
