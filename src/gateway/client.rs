//! Gateway Client - Hands out publish objects
//!
//! The client owns the transport and configuration shared by every publish
//! it creates. In dry-run mode it never touches the transport and hands out
//! [`DryRunPublish`] objects instead.

use crate::core::config::GatewayConfig;
use crate::core::error::Result;
use crate::core::traits::{Method, ProgressObserver, Publish, Request, Transport, decode_response};
use crate::gateway::http::HttpTransport;
use crate::gateway::models::PublishRecord;
use crate::orchestration::dry_run::DryRunPublish;
use crate::orchestration::progress::TracingObserver;
use crate::orchestration::session::{
    PublishSession, SELF_LINK, SessionSettings, publish_path, resumed_links,
};
use crate::security::GatewayTokenManager;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct GatewayClient {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn ProgressObserver>,
}

impl GatewayClient {
    /// Create a client talking HTTP to the configured gateway
    pub fn new(config: GatewayConfig, tokens: GatewayTokenManager) -> Result<Self> {
        let transport = HttpTransport::from_config(&config, tokens)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default `tracing` progress observer
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Create a new publish within the gateway
    pub async fn new_publish(&self, cancel: &CancellationToken) -> Result<Box<dyn Publish>> {
        if self.config.dry_run() {
            return Ok(Box::new(self.dry_run_publish()));
        }
        Ok(Box::new(self.new_session(cancel).await?))
    }

    /// Resume the existing publish `id`
    ///
    /// Fails if the gateway does not know the publish.
    pub async fn get_publish(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<Box<dyn Publish>> {
        if self.config.dry_run() {
            return Ok(Box::new(self.dry_run_publish()));
        }
        Ok(Box::new(self.resume_session(cancel, id).await?))
    }

    /// `POST /{env}/publish` and build a session from the response
    pub async fn new_session(&self, cancel: &CancellationToken) -> Result<PublishSession> {
        let url = format!("/{}/publish", self.config.env());
        let request = Request::post(&url).idempotent();

        let value = self
            .transport
            .send_cancellable(cancel, request, "creating publish")
            .await?;
        let record: PublishRecord = decode_response(value, Method::Post, &url)?;

        info!(publish = %record.id, env = %record.env, "Created publish");
        Ok(self.session(record))
    }

    /// Build a session for the existing publish `id`, after checking it exists
    pub async fn resume_session(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<PublishSession> {
        let env = self.config.env();
        let record = PublishRecord {
            id: id.to_string(),
            env: env.to_string(),
            state: None,
            links: resumed_links(env, id),
        };

        // Only the status matters; the lookup body carries no links.
        let url = record
            .links
            .get(SELF_LINK)
            .cloned()
            .unwrap_or_else(|| publish_path(env, id));
        self.transport
            .send_cancellable(cancel, Request::get(url), "looking up publish")
            .await?;

        debug!(publish = %id, env = %env, "Resumed publish");
        Ok(self.session(record))
    }

    fn session(&self, record: PublishRecord) -> PublishSession {
        PublishSession::new(
            record,
            Arc::clone(&self.transport),
            Arc::clone(&self.observer),
            SessionSettings::from(&self.config),
        )
    }

    fn dry_run_publish(&self) -> DryRunPublish {
        DryRunPublish::new(self.config.batch_size())
    }
}
