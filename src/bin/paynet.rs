use clap::Parser;
use paynet_admin::cli::utils::output_error;
use paynet_admin::cli::{Cli, OutputFormat};
use paynet_admin::error::ConsoleError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = paynet_admin::cli::run(cli).await {
        let code = e.downcast_ref::<ConsoleError>().map(ConsoleError::error_code);
        let message = match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => format!("{e:?}"),
            _ => match e.downcast_ref::<ConsoleError>() {
                Some(console) => console.user_message(),
                None => e.to_string(),
            },
        };
        output_error(&output_format, &message, code)?;
        std::process::exit(1);
    }

    Ok(())
}
