//! Configuration structures for gateway-publisher
//!
//! Every field is optional so that configuration layers (defaults, files,
//! environment, CLI) can be merged field by field. Accessors fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of items sent per add-items request
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Delay between task polls, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// Per-request HTTP timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable holding the gateway bearer token
pub const DEFAULT_TOKEN_ENV: &str = "GW_TOKEN";

/// Gateway client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Base URL of the gateway (e.g. "https://gw.example.com")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Target environment name (e.g. "live", "pre")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,

    /// Maximum number of items per add-items request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Delay between task polls in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,

    /// Per-request HTTP timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Never contact the gateway; log what would be done instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,

    /// Name of the environment variable holding the bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: None,
            env: None,
            batch_size: Some(DEFAULT_BATCH_SIZE),
            poll_interval: Some(DEFAULT_POLL_INTERVAL_MS),
            timeout: Some(DEFAULT_TIMEOUT_SECS),
            dry_run: Some(false),
            token_env: Some(DEFAULT_TOKEN_ENV.to_string()),
        }
    }
}

impl GatewayConfig {
    /// An empty layer, used as the starting point for overrides
    pub fn empty() -> Self {
        Self {
            url: None,
            env: None,
            batch_size: None,
            poll_interval: None,
            timeout: None,
            dry_run: None,
            token_env: None,
        }
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    pub fn env(&self) -> &str {
        self.env.as_deref().unwrap_or_default()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }

    pub fn token_env(&self) -> &str {
        self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }
}
