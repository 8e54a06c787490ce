use paynet_admin::config::config;
use paynet_admin::gateway::{self, GatewayState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up PAYNET_BACKEND_URL, PAYNET_GATEWAY_PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let config = config();
    tracing::info!("Starting PayNet gateway in {:?} mode", config.environment);

    let state = GatewayState::from_config(config)?;
    let app = gateway::app(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!(
        "Gateway listening on http://{} (backend {})",
        bind_addr,
        config.backend.base_url
    );

    axum::serve(listener, app).await?;
    Ok(())
}
