//! Batch Submitter - Adds items to a publish in bounded batches
//!
//! Features:
//! - Sequential submission, one request in flight at a time
//! - Batches are sliced lazily off the front of the item list
//! - Every request carries its own idempotency key
//! - Stops at the first failed batch

use crate::core::error::{GatewayError, Result};
use crate::core::traits::{ProgressObserver, Request, Transport};
use crate::gateway::models::ItemInput;
use tokio_util::sync::CancellationToken;

/// Number of batches needed for `item_count` items
///
/// Zero items always need zero batches, whatever the batch size.
pub fn total_batches(item_count: usize, batch_size: usize) -> usize {
    if item_count == 0 || batch_size == 0 {
        return 0;
    }
    item_count.div_ceil(batch_size)
}

/// Submits an item list to a publish's `self` link in fixed-size batches
pub struct BatchSubmitter<'a> {
    transport: &'a dyn Transport,
    observer: &'a dyn ProgressObserver,
    batch_size: usize,
}

impl<'a> BatchSubmitter<'a> {
    /// Create a new BatchSubmitter
    ///
    /// # Arguments
    ///
    /// * `transport` - Transport used for the PUT requests
    /// * `observer` - Receives batch and item progress
    /// * `batch_size` - Maximum number of items per request
    pub fn new(
        transport: &'a dyn Transport,
        observer: &'a dyn ProgressObserver,
        batch_size: usize,
    ) -> Self {
        Self {
            transport,
            observer,
            batch_size,
        }
    }

    /// Submit all `items` to `url`, in order
    ///
    /// # Returns
    ///
    /// Number of batches submitted
    pub async fn submit(
        &self,
        cancel: &CancellationToken,
        url: &str,
        items: &[ItemInput],
    ) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        if self.batch_size == 0 {
            return Err(GatewayError::Config(
                "batch size must be greater than zero".to_string(),
            ));
        }

        let total = total_batches(items.len(), self.batch_size);

        for (index, batch) in items.chunks(self.batch_size).enumerate() {
            let current = index + 1;
            let operation = format!("adding batch {} of {}", current, total);

            if cancel.is_cancelled() {
                return Err(GatewayError::Cancelled { operation });
            }

            self.observer.batch_started(current, total, batch.len());
            for item in batch {
                self.observer.item_queued(item, url);
            }

            let body = serde_json::to_value(batch).map_err(|e| GatewayError::Decode {
                method: "PUT".to_string(),
                url: url.to_string(),
                message: format!("failed to encode batch: {}", e),
            })?;
            let request = Request::put(url, body).idempotent();
            self.transport
                .send_cancellable(cancel, request, &operation)
                .await?;
        }

        Ok(total)
    }
}
