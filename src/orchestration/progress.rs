//! Default progress observer, reporting through `tracing`

use crate::core::traits::ProgressObserver;
use crate::gateway::models::{ItemInput, Task, TaskState};
use tracing::{debug, info, warn};

/// Emits progress as `tracing` events
///
/// Batch progress goes out at info level as a gradual progress indicator;
/// per-item and per-poll detail at debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn batch_started(&self, current: usize, total: usize, size: usize) {
        info!(
            current_batch = current,
            total_batches = total,
            items = size,
            "Preparing the next batch of items"
        );
    }

    fn item_queued(&self, item: &ItemInput, url: &str) {
        debug!(
            web_uri = %item.web_uri,
            object_key = %item.object_key,
            content_type = %item.content_type,
            link_to = %item.link_to,
            %url,
            "Adding to publish object"
        );
    }

    fn commit_started(&self, publish_id: &str) {
        info!(publish = %publish_id, "Committing publish");
    }

    fn task_polled(&self, task: &Task, poll: usize) {
        if task.state == TaskState::Unknown {
            warn!(task = %task.id, poll, "Task reported an unrecognized state, still waiting");
        } else {
            debug!(task = %task.id, state = task.state.as_str(), poll, "Polled task");
        }
    }
}
