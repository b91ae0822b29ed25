//! Commit Coordinator - Starts the commit task and waits for it
//!
//! Committing is asynchronous within the gateway: the commit request only
//! returns a task. The coordinator hands that task to [`TaskAwaiter`] so a
//! commit is only reported once the gateway has finished it.

use crate::core::error::{GatewayError, Result};
use crate::core::traits::{Method, ProgressObserver, Request, Transport, decode_response};
use crate::gateway::models::Task;
use crate::orchestration::task_awaiter::TaskAwaiter;
use tokio_util::sync::CancellationToken;

pub struct CommitCoordinator<'a> {
    transport: &'a dyn Transport,
    observer: &'a dyn ProgressObserver,
    awaiter: TaskAwaiter<'a>,
}

impl<'a> CommitCoordinator<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        observer: &'a dyn ProgressObserver,
        awaiter: TaskAwaiter<'a>,
    ) -> Self {
        Self {
            transport,
            observer,
            awaiter,
        }
    }

    /// Commit the publish `publish_id` through its `commit_url`
    ///
    /// # Returns
    ///
    /// The final representation of the succeeded commit task
    pub async fn commit(
        &self,
        cancel: &CancellationToken,
        publish_id: &str,
        commit_url: &str,
    ) -> Result<Task> {
        let operation = format!("committing publish {}", publish_id);
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled { operation });
        }

        self.observer.commit_started(publish_id);

        let request = Request::post(commit_url).idempotent();
        let value = self
            .transport
            .send_cancellable(cancel, request, &operation)
            .await?;
        let task: Task = decode_response(value, Method::Post, commit_url)?;

        self.awaiter.await_task(cancel, &task).await
    }
}
