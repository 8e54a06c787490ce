use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use url::Url;

use super::envelope::Envelope;
use crate::config::BackendConfig;
use crate::error::ConsoleError;

/// Empty query string for [`ApiClient::get`]
pub const NO_QUERY: &[(&str, String)] = &[];

/// Thin JSON client for the console backend.
///
/// Every call decodes the `{ success, message, data }` envelope and turns
/// `success: false` into [`ConsoleError::Rejected`] with the server's message.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    ip_lookup_url: Option<String>,
    log_requests: bool,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConsoleError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self { http, base_url, ip_lookup_url: None, log_requests: false })
    }

    pub fn from_config(backend: &BackendConfig) -> Result<Self, ConsoleError> {
        let mut client = Self::new(&backend.base_url, backend.request_timeout())?;
        client.ip_lookup_url = backend.ip_lookup_url.clone();
        client.log_requests = backend.log_requests;
        Ok(client)
    }

    pub fn with_ip_lookup(mut self, url: Option<String>) -> Self {
        self.ip_lookup_url = url;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an `/api/...` path, keeping any path prefix on the base
    pub fn endpoint(&self, path: &str) -> Result<Url, ConsoleError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    pub async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Envelope<T>, ConsoleError> {
        let request = self.request(Method::GET, path)?.query(query);
        self.send(Method::GET, path, request).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope<T>, ConsoleError> {
        let request = self.request(Method::POST, path)?.json(body);
        self.send(Method::POST, path, request).await
    }

    /// GET for endpoints that answer with a bare JSON body instead of the envelope
    pub async fn get_raw<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConsoleError> {
        let request = self.request(Method::GET, path)?;
        self.send_raw(Method::GET, path, request).await
    }

    pub async fn post_raw<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let request = self.request(Method::POST, path)?.json(body);
        self.send_raw(Method::POST, path, request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ConsoleError> {
        let request = self.request(Method::DELETE, path)?;
        self.send(Method::DELETE, path, request).await
    }

    /// Public address of this machine for edit audit records.
    ///
    /// Lookup failures are not errors; the edit goes through with `"unknown"`.
    pub async fn public_ip(&self) -> String {
        let Some(lookup) = self.ip_lookup_url.as_deref() else {
            return "unknown".to_string();
        };

        #[derive(serde::Deserialize)]
        struct IpReply {
            ip: String,
        }

        let reply = async {
            let response = self.http.get(lookup).send().await?.error_for_status()?;
            response.json::<IpReply>().await
        }
        .await;

        match reply {
            Ok(reply) if !reply.ip.trim().is_empty() => reply.ip,
            Ok(_) => "unknown".to_string(),
            Err(e) => {
                tracing::warn!("public ip lookup failed: {}", e);
                "unknown".to_string()
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ConsoleError> {
        let url = self.endpoint(path)?;
        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ConsoleError> {
        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::error!("{} {} failed: {}", method, path, e);
            ConsoleError::Transport(e)
        })?;

        if self.log_requests {
            tracing::info!(
                "{} {} -> {} ({}ms)",
                method,
                path,
                response.status(),
                started.elapsed().as_millis()
            );
        } else {
            tracing::debug!("{} {} -> {}", method, path, response.status());
        }

        decode(response).await
    }

    async fn send_raw<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ConsoleError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("{} {} failed: {}", method, path, e);
            ConsoleError::Transport(e)
        })?;
        tracing::debug!("{} {} -> {}", method, path, response.status());

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|e| e.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(ConsoleError::rejected_with_status(message, status.as_u16()));
        }
        serde_json::from_slice(&body).map_err(|e| ConsoleError::invalid_response(e.to_string()))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, ConsoleError> {
    let status = response.status();
    let body = response.bytes().await?;

    match serde_json::from_slice::<Envelope<T>>(&body) {
        Ok(envelope) if status.is_success() => envelope.into_result(),
        // Error statuses that still carry an envelope keep the server's message
        Ok(envelope) => match envelope.into_result() {
            Ok(_) => Err(ConsoleError::rejected_with_status(
                format!("Request failed with status {}", status.as_u16()),
                status.as_u16(),
            )),
            Err(ConsoleError::Rejected { message, .. }) => {
                Err(ConsoleError::rejected_with_status(message, status.as_u16()))
            }
            Err(other) => Err(other),
        },
        Err(_) if !status.is_success() => Err(ConsoleError::rejected_with_status(
            format!("Request failed with status {}", status.as_u16()),
            status.as_u16(),
        )),
        Err(e) => Err(ConsoleError::invalid_response(e.to_string())),
    }
}
