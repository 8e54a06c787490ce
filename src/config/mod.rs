use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub console: ConsoleConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Public-IP lookup used to stamp commission edits; `None` sends "unknown"
    pub ip_lookup_url: Option<String>,
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub search_debounce_ms: u64,
    pub default_page_size: u32,
    pub commission_page_size: u32,
    pub saved_indicator_ms: u64,
    pub max_levels: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub port: u16,
    pub proxy_timeout_secs: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ConsoleConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn saved_indicator(&self) -> Duration {
        Duration::from_millis(self.saved_indicator_ms)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment preset first, then individual overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Backend overrides
        if let Ok(v) = env::var("PAYNET_BACKEND_URL") {
            self.backend.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("PAYNET_REQUEST_TIMEOUT_SECS") {
            self.backend.request_timeout_secs = v.parse().unwrap_or(self.backend.request_timeout_secs);
        }
        if let Ok(v) = env::var("PAYNET_IP_LOOKUP_URL") {
            self.backend.ip_lookup_url = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("PAYNET_LOG_REQUESTS") {
            self.backend.log_requests = v.parse().unwrap_or(self.backend.log_requests);
        }

        // Console overrides
        if let Ok(v) = env::var("PAYNET_DEBOUNCE_MS") {
            self.console.search_debounce_ms = v.parse().unwrap_or(self.console.search_debounce_ms);
        }
        if let Ok(v) = env::var("PAYNET_PAGE_SIZE") {
            self.console.default_page_size = v.parse().unwrap_or(self.console.default_page_size);
        }
        if let Ok(v) = env::var("PAYNET_COMMISSION_PAGE_SIZE") {
            self.console.commission_page_size = v.parse().unwrap_or(self.console.commission_page_size);
        }
        if let Ok(v) = env::var("PAYNET_SAVED_INDICATOR_MS") {
            self.console.saved_indicator_ms = v.parse().unwrap_or(self.console.saved_indicator_ms);
        }

        // Gateway overrides
        if let Ok(v) = env::var("PAYNET_GATEWAY_PORT").or_else(|_| env::var("PORT")) {
            self.gateway.port = v.parse().unwrap_or(self.gateway.port);
        }
        if let Ok(v) = env::var("PAYNET_PROXY_TIMEOUT_SECS") {
            self.gateway.proxy_timeout_secs = v.parse().unwrap_or(self.gateway.proxy_timeout_secs);
        }
        if let Ok(v) = env::var("PAYNET_ENABLE_CORS") {
            self.gateway.enable_cors = v.parse().unwrap_or(self.gateway.enable_cors);
        }
        if let Ok(v) = env::var("PAYNET_CORS_ORIGINS") {
            self.gateway.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            backend: BackendConfig {
                base_url: "http://127.0.0.1:22909".to_string(),
                request_timeout_secs: 30,
                ip_lookup_url: Some("https://api.ipify.org?format=json".to_string()),
                log_requests: true,
            },
            console: ConsoleConfig {
                search_debounce_ms: 300,
                default_page_size: 10,
                commission_page_size: 12,
                saved_indicator_ms: 2000,
                max_levels: 12,
            },
            gateway: GatewayConfig {
                port: 23345,
                proxy_timeout_secs: 30,
                enable_cors: true,
                cors_origins: vec!["http://localhost:5173".to_string(), "http://localhost:23345".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            backend: BackendConfig {
                base_url: "https://staging-api.example.com".to_string(),
                request_timeout_secs: 20,
                ip_lookup_url: Some("https://api.ipify.org?format=json".to_string()),
                log_requests: true,
            },
            console: ConsoleConfig {
                search_debounce_ms: 300,
                default_page_size: 10,
                commission_page_size: 12,
                saved_indicator_ms: 2000,
                max_levels: 12,
            },
            gateway: GatewayConfig {
                port: 23345,
                proxy_timeout_secs: 30,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            backend: BackendConfig {
                base_url: "https://api.example.com".to_string(),
                request_timeout_secs: 15,
                ip_lookup_url: Some("https://api.ipify.org?format=json".to_string()),
                log_requests: false,
            },
            console: ConsoleConfig {
                search_debounce_ms: 300,
                default_page_size: 10,
                commission_page_size: 12,
                saved_indicator_ms: 2000,
                max_levels: 12,
            },
            gateway: GatewayConfig {
                port: 23345,
                proxy_timeout_secs: 30,
                enable_cors: false,
                cors_origins: vec!["https://admin.example.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
