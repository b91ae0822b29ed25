//! HTTP transport for the gateway, built on `reqwest`

use crate::core::config::GatewayConfig;
use crate::core::error::{GatewayError, Result};
use crate::core::traits::{Method, Request, Transport};
use crate::security::GatewayTokenManager;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Header carrying the per-request idempotency key
pub const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

/// [`Transport`] implementation talking JSON over HTTP(S)
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    tokens: GatewayTokenManager,
}

impl HttpTransport {
    /// Create a transport for the gateway at `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Gateway root; relative links are resolved against it
    /// * `timeout` - Per-request timeout
    /// * `tokens` - Source of the optional bearer token
    pub fn new(base_url: &str, timeout: Duration, tokens: GatewayTokenManager) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gw-publish/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(config: &GatewayConfig, tokens: GatewayTokenManager) -> Result<Self> {
        Self::new(config.url(), config.timeout(), tokens)
    }

    /// Resolve a gateway link against the base URL
    ///
    /// Absolute links are used unchanged.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<serde_json::Value> {
        let url = self.resolve_url(&request.url);
        let method = request.method.to_string();

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        }
        .header(ACCEPT, "application/json");

        if let Some(token) = self.tokens.token() {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let idempotency_key = request.idempotent.then(|| Uuid::new_v4().to_string());
        if let Some(key) = &idempotency_key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(%method, %url, idempotency_key = ?idempotency_key, "Sending gateway request");

        let network_error = |e: reqwest::Error| GatewayError::Network {
            method: method.clone(),
            url: url.clone(),
            message: self.tokens.mask_token_in_string(&e.to_string()),
        };

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status();
        let text = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            return Err(GatewayError::Http {
                method,
                url,
                status: status.as_u16(),
                body: self.tokens.mask_token_in_string(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Decode {
            method,
            url,
            message: e.to_string(),
        })
    }
}
