use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use super::response::failure;
use super::GatewayState;

pub const PROXY_FAILURE_MESSAGE: &str = "Could not reach the server. Please try again shortly.";

/// Forwards `/api/*` to the backend unchanged, forcing JSON headers
pub async fn forward(
    State(state): State<GatewayState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or(uri.path());
    let target = format!("{}{}", state.backend_origin(), path_and_query);
    tracing::debug!("Proxy request: {} {} -> {}", method, uri, target);

    let result = state
        .http
        .request(method, &target)
        .header(header::ACCEPT, "application/json")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await;

    let upstream = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Proxy error for {}: {}", target, e);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, PROXY_FAILURE_MESSAGE);
        }
    };

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();

    match upstream.bytes().await {
        Ok(bytes) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::CONTENT_TYPE,
                content_type.unwrap_or(HeaderValue::from_static("application/json")),
            );
            (status, headers, bytes).into_response()
        }
        Err(e) => {
            tracing::error!("Proxy body read failed for {}: {}", target, e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, PROXY_FAILURE_MESSAGE)
        }
    }
}
