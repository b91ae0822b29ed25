//! Publish Session - One publish object within the gateway
//!
//! A session knows its identifier, environment and the links the gateway
//! advertises for it. Adding items and committing only ever follow those
//! links.

use crate::core::config::GatewayConfig;
use crate::core::error::{GatewayError, Result};
use crate::core::traits::{ProgressObserver, Publish, Transport};
use crate::gateway::models::{ItemInput, PublishRecord};
use crate::orchestration::batch_submitter::BatchSubmitter;
use crate::orchestration::commit::CommitCoordinator;
use crate::orchestration::task_awaiter::TaskAwaiter;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

/// Link used to add items to a publish
pub const SELF_LINK: &str = "self";

/// Link used to commit a publish
pub const COMMIT_LINK: &str = "commit";

/// Tunables a session needs from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub batch_size: usize,
    pub poll_interval: Duration,
}

impl From<&GatewayConfig> for SessionSettings {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            batch_size: config.batch_size(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Path of the publish `id` within environment `env`
pub fn publish_path(env: &str, id: &str) -> String {
    format!("/{}/publish/{}", env, id)
}

/// Links assumed for an existing publish
///
/// The gateway does not return links when a publish is merely looked up, so
/// they are derived from the identifier in the same shape the gateway uses
/// when it creates one. They are only trusted after a successful lookup.
pub fn resumed_links(env: &str, id: &str) -> HashMap<String, String> {
    let self_url = publish_path(env, id);
    HashMap::from([
        (COMMIT_LINK.to_string(), format!("{}/commit", self_url)),
        (SELF_LINK.to_string(), self_url),
    ])
}

pub struct PublishSession {
    record: PublishRecord,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn ProgressObserver>,
    settings: SessionSettings,
}

impl PublishSession {
    pub fn new(
        record: PublishRecord,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn ProgressObserver>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            record,
            transport,
            observer,
            settings,
        }
    }

    pub fn env(&self) -> &str {
        &self.record.env
    }

    /// State reported by the gateway when the publish was created
    pub fn state(&self) -> Option<&str> {
        self.record.state.as_deref()
    }

    pub fn links(&self) -> &HashMap<String, String> {
        &self.record.links
    }

    /// URL of the named link, or a session-state error if it is absent
    pub fn link(&self, name: &str) -> Result<&str> {
        self.record
            .links
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| GatewayError::MissingLink {
                resource: format!("publish {}", self.record.id),
                link: name.to_string(),
            })
    }

    fn awaiter(&self) -> TaskAwaiter<'_> {
        TaskAwaiter::new(
            self.transport.as_ref(),
            self.observer.as_ref(),
            self.settings.poll_interval,
        )
    }

    async fn commit_and_wait(&self, cancel: &CancellationToken) -> Result<()> {
        let url = self.link(COMMIT_LINK)?;
        let coordinator = CommitCoordinator::new(
            self.transport.as_ref(),
            self.observer.as_ref(),
            self.awaiter(),
        );

        match coordinator.commit(cancel, &self.record.id, url).await {
            Ok(task) => {
                info!(task = %task.id, "Publish committed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Commit did not complete");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for PublishSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishSession")
            .field("record", &self.record)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Publish for PublishSession {
    fn id(&self) -> &str {
        &self.record.id
    }

    async fn add_items(&self, cancel: &CancellationToken, items: &[ItemInput]) -> Result<()> {
        let url = self.link(SELF_LINK)?;

        let submitter = BatchSubmitter::new(
            self.transport.as_ref(),
            self.observer.as_ref(),
            self.settings.batch_size,
        );
        let batches = submitter.submit(cancel, url, items).await?;

        info!(publish = %self.id(), items = items.len(), batches, "Added items to publish");
        Ok(())
    }

    async fn commit(&self, cancel: &CancellationToken) -> Result<()> {
        let span = info_span!("commit", publish = %self.id());
        self.commit_and_wait(cancel).instrument(span).await
    }
}
