use std::fs;
use std::path::PathBuf;

use crate::api::ApiClient;
use crate::config::config;
use crate::session::{Session, SessionStore};

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("PAYNET_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("paynet").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_store() -> anyhow::Result<SessionStore> {
    Ok(SessionStore::new(get_config_dir()?.join("session.json")))
}

/// Stored session; fails when nobody is signed in
pub fn load_session() -> anyhow::Result<Session> {
    let session = session_store()?.load()?;
    if !session.is_authenticated() {
        return Err(anyhow::anyhow!("Not signed in. Run `paynet session login` first"));
    }
    Ok(session)
}

/// Client for the configured backend, or `backend` when given
pub fn api_client(backend: Option<&str>) -> anyhow::Result<ApiClient> {
    let settings = &config().backend;
    let client = match backend {
        Some(url) => ApiClient::new(url, settings.request_timeout())?.with_ip_lookup(settings.ip_lookup_url.clone()),
        None => ApiClient::from_config(settings)?,
    };
    tracing::debug!("Using backend {}", client.base_url());
    Ok(client)
}
