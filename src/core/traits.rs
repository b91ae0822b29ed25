//! Core traits and types for gateway publishing
//!
//! This module defines the seams between the publish lifecycle and its
//! collaborators: the HTTP transport, the progress observer, and the
//! publish object handed to callers.

use crate::core::error::{GatewayError, Result};
use crate::gateway::models::{ItemInput, Task};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Transport
// ============================================================================

/// HTTP method used against the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        })
    }
}

/// A single JSON request against the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path relative to the gateway base URL, or an absolute URL
    pub url: String,
    pub body: Option<serde_json::Value>,
    /// Attach a freshly generated `X-Idempotency-Key` header
    pub idempotent: bool,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
            idempotent: false,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: None,
            idempotent: false,
        }
    }

    pub fn put(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Put,
            url: url.into(),
            body: Some(body),
            idempotent: false,
        }
    }

    /// Mark this request as an idempotent write
    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }
}

/// Performs JSON requests against the gateway
///
/// Implementations encode the body, send the request, and decode the
/// response body. Non-success statuses and network failures are returned as
/// transport errors. An empty response body decodes to `Value::Null`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<serde_json::Value>;

    /// Send `request` unless `cancel` fires first
    ///
    /// A token that is already cancelled wins without a request being made.
    /// `operation` names what was interrupted in the resulting error.
    async fn send_cancellable(
        &self,
        cancel: &CancellationToken,
        request: Request,
        operation: &str,
    ) -> Result<serde_json::Value> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::Cancelled {
                operation: operation.to_string(),
            }),
            result = self.send(request) => result,
        }
    }
}

/// Decode a response body into the expected gateway type
pub fn decode_response<T: DeserializeOwned>(
    value: serde_json::Value,
    method: Method,
    url: &str,
) -> Result<T> {
    serde_json::from_value(value).map_err(|e| GatewayError::Decode {
        method: method.to_string(),
        url: url.to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Progress
// ============================================================================

/// Receives progress events from the publish lifecycle
///
/// All methods have empty defaults so observers only implement what they
/// care about.
pub trait ProgressObserver: Send + Sync {
    /// A batch is about to be submitted (`current` is 1-based)
    fn batch_started(&self, _current: usize, _total: usize, _size: usize) {}

    /// An item is part of the batch about to be submitted to `url`
    fn item_queued(&self, _item: &ItemInput, _url: &str) {}

    /// A commit request is about to be sent for `publish_id`
    fn commit_started(&self, _publish_id: &str) {}

    /// A fresh representation of a task was received
    fn task_polled(&self, _task: &Task, _poll: usize) {}
}

// ============================================================================
// Publish
// ============================================================================

/// A publish object within the gateway
///
/// Obtained from [`crate::gateway::GatewayClient`], either as a real session
/// or as a dry-run stand-in.
#[async_trait]
pub trait Publish: Send + Sync {
    /// Identifier assigned by the gateway
    fn id(&self) -> &str;

    /// Add all of the given items to this publish, in order
    ///
    /// This may involve multiple requests to the gateway. Returns on the
    /// first failed request; earlier batches stay added.
    async fn add_items(&self, cancel: &CancellationToken, items: &[ItemInput]) -> Result<()>;

    /// Commit this publish and wait for the commit task to finish
    ///
    /// Returns `Ok` only if the commit task succeeded.
    async fn commit(&self, cancel: &CancellationToken) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Put.to_string(), "PUT");
    }

    #[test]
    fn test_request_builders() {
        let request = Request::put("/live/publish/1", serde_json::json!([])).idempotent();
        assert_eq!(request.method, Method::Put);
        assert!(request.idempotent);
        assert_eq!(request.body, Some(serde_json::json!([])));

        let request = Request::get("/task/1");
        assert!(!request.idempotent);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_decode_response_mismatch() {
        let result: Result<Task> =
            decode_response(serde_json::json!({"nope": 1}), Method::Post, "/live/publish/1/commit");

        let error = result.unwrap_err();
        assert_eq!(error.code(), "DECODE_ERROR");
        assert!(error.to_string().starts_with("POST /live/publish/1/commit"));
    }

    #[test]
    fn test_observer_defaults_are_noops() {
        struct Silent;
        impl ProgressObserver for Silent {}

        let observer = Silent;
        observer.batch_started(1, 1, 0);
        observer.commit_started("abc");
    }
}
