//! Stand-in publish used when the gateway must not be contacted

use crate::core::error::{GatewayError, Result};
use crate::core::traits::Publish;
use crate::gateway::models::ItemInput;
use crate::orchestration::batch_submitter::total_batches;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Identifier reported by every dry-run publish
pub const DRY_RUN_PUBLISH_ID: &str = "dry-run";

/// A publish that only logs what would have been sent
#[derive(Debug, Clone)]
pub struct DryRunPublish {
    batch_size: usize,
}

impl DryRunPublish {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }
}

#[async_trait]
impl Publish for DryRunPublish {
    fn id(&self) -> &str {
        DRY_RUN_PUBLISH_ID
    }

    async fn add_items(&self, cancel: &CancellationToken, items: &[ItemInput]) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled {
                operation: "adding items".to_string(),
            });
        }

        info!(
            items = items.len(),
            batches = total_batches(items.len(), self.batch_size),
            "Dry run: would add items to publish"
        );
        Ok(())
    }

    async fn commit(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled {
                operation: "committing publish".to_string(),
            });
        }

        info!("Dry run: would commit publish");
        Ok(())
    }
}
