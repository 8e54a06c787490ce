//! HTTP gateway: forwards `/api/*` to the settlement backend and serves the
//! console's own read-only views.

mod levels;
mod proxy;
mod response;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{any, get},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::ConsoleError;

pub use proxy::PROXY_FAILURE_MESSAGE;
pub use response::{failure, ApiResponse, ApiResult};

#[derive(Clone)]
pub struct GatewayState {
    http: reqwest::Client,
    api: ApiClient,
}

impl GatewayState {
    pub fn new(api: ApiClient, proxy_timeout: Duration) -> Result<Self, ConsoleError> {
        let http = reqwest::Client::builder().timeout(proxy_timeout).build()?;
        Ok(Self { http, api })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConsoleError> {
        let api = ApiClient::from_config(&config.backend)?;
        Self::new(api, Duration::from_secs(config.gateway.proxy_timeout_secs))
    }

    /// Backend base without a trailing slash; request paths are appended verbatim
    fn backend_origin(&self) -> &str {
        self.api.base_url().as_str().trim_end_matches('/')
    }
}

pub fn app(state: GatewayState, config: &AppConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/console/levels", get(levels::level_rows))
        .route("/api/*path", any(proxy::forward))
        .fallback(not_found)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.gateway.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .gateway
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "PayNet Admin Gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health",
                "levels": "/console/levels",
                "api": "/api/* (forwarded to the settlement backend)",
            }
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}

async fn not_found() -> impl IntoResponse {
    failure(StatusCode::NOT_FOUND, "Not found")
}
