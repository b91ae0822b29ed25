//! Error handling for gateway publishing
//!
//! This module provides the error type shared by the transport, the publish
//! session and the task awaiter, with recovery guidance attached to each
//! variant.

use thiserror::Error;

/// Main error type for gateway publish operations
#[derive(Error, Debug)]
pub enum GatewayError {
    // Transport errors
    #[error("{method} {url}: request failed: {message}")]
    Network {
        method: String,
        url: String,
        message: String,
    },

    #[error("{method} {url}: gateway responded {status}: {body}")]
    Http {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url}: unexpected response body: {message}")]
    Decode {
        method: String,
        url: String,
        message: String,
    },

    // Session state errors
    #[error("{resource} is missing '{link}' link")]
    MissingLink { resource: String, link: String },

    // Task errors
    #[error("task {task_id} failed (state {state}): {detail}")]
    TaskFailed {
        task_id: String,
        state: String,
        detail: String,
    },

    #[error("cancelled while {operation}")]
    Cancelled { operation: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Check if this error came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Http { .. } | Self::Decode { .. }
        )
    }

    /// Check if this error is recoverable by re-running the same operation
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Cancelled { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 409 || *status == 429,
            Self::Decode { .. }
            | Self::MissingLink { .. }
            | Self::TaskFailed { .. }
            | Self::Config(_) => false,
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::Network { .. } => vec![
                "Check network connectivity to the gateway",
                "Re-run the command; writes are idempotent",
            ],
            Self::Http { status, .. } if *status == 401 || *status == 403 => vec![
                "Check the gateway credentials (GW_TOKEN)",
                "Check that the credentials are allowed to use this environment",
            ],
            Self::Http { status, .. } if *status == 404 => vec![
                "Check the publish ID",
                "Check the configured environment (GW_ENV)",
            ],
            Self::Http { .. } => vec![
                "Inspect the response body for details",
                "Check the gateway status",
            ],
            Self::Decode { .. } => vec!["Check that the gateway URL points at a compatible gateway"],
            Self::MissingLink { .. } => vec![
                "The publish may already be committed",
                "Create a new publish and try again",
            ],
            Self::TaskFailed { .. } => vec![
                "Inspect the gateway logs for the task",
                "Create a new publish and try again",
            ],
            Self::Cancelled { .. } => vec![
                "Increase --deadline if the gateway is slow",
                "A commit task keeps running server-side after cancellation",
            ],
            Self::Config(_) => vec!["Check .gw-publish.yaml and GW_* environment variables"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network { .. } => "NETWORK_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::MissingLink { .. } => "MISSING_LINK",
            Self::TaskFailed { .. } => "TASK_FAILED",
            Self::Cancelled { .. } => "CANCELLED",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> GatewayError {
        GatewayError::Http {
            method: "PUT".to_string(),
            url: "https://gw.example.com/live/publish/abc".to_string(),
            status,
            body: "{\"detail\":\"nope\"}".to_string(),
        }
    }

    #[test]
    fn test_transport_errors() {
        let error = GatewayError::Network {
            method: "GET".to_string(),
            url: "https://gw.example.com/task/1".to_string(),
            message: "connection refused".to_string(),
        };

        assert!(error.is_transport());
        assert!(error.is_recoverable());
        assert_eq!(error.code(), "NETWORK_ERROR");
        assert!(http(500).is_transport());
    }

    #[test]
    fn test_http_error_display() {
        let display = http(404).to_string();
        assert!(display.contains("PUT"));
        assert!(display.contains("404"));
        assert!(display.contains("nope"));
    }

    #[test]
    fn test_http_recoverability_by_status() {
        assert!(http(503).is_recoverable());
        assert!(http(429).is_recoverable());
        assert!(!http(400).is_recoverable());
        assert!(!http(404).is_recoverable());
    }

    #[test]
    fn test_http_suggestions_by_status() {
        assert!(http(401).suggested_actions().iter().any(|a| a.contains("GW_TOKEN")));
        assert!(http(404).suggested_actions().iter().any(|a| a.contains("publish ID")));
    }

    #[test]
    fn test_missing_link_is_not_transport() {
        let error = GatewayError::MissingLink {
            resource: "publish abc".to_string(),
            link: "commit".to_string(),
        };

        assert!(!error.is_transport());
        assert!(!error.is_recoverable());
        assert_eq!(error.code(), "MISSING_LINK");
        assert_eq!(error.to_string(), "publish abc is missing 'commit' link");
    }

    #[test]
    fn test_task_failed_carries_detail() {
        let error = GatewayError::TaskFailed {
            task_id: "t1".to_string(),
            state: "FAILED".to_string(),
            detail: "deadline exceeded".to_string(),
        };

        assert_eq!(error.code(), "TASK_FAILED");
        assert!(error.to_string().contains("deadline exceeded"));
        assert!(!error.suggested_actions().is_empty());
    }

    #[test]
    fn test_cancelled_error() {
        let error = GatewayError::Cancelled {
            operation: "awaiting task t1".to_string(),
        };

        assert!(!error.is_transport());
        assert_eq!(error.code(), "CANCELLED");
        assert_eq!(error.to_string(), "cancelled while awaiting task t1");
    }
}
