//! Waits for a gateway task to reach a terminal state

use crate::core::error::{GatewayError, Result};
use crate::core::traits::{Method, ProgressObserver, Request, Transport, decode_response};
use crate::gateway::models::{Task, TaskOutcome};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Polls a task until it succeeds or fails
///
/// Each poll replaces the previously seen representation of the task. There
/// is no limit on the number of polls; the caller bounds the wait through
/// the cancellation token, which is honoured before every request, while a
/// request is in flight, and during the pause between polls.
pub struct TaskAwaiter<'a> {
    transport: &'a dyn Transport,
    observer: &'a dyn ProgressObserver,
    poll_interval: Duration,
}

impl<'a> TaskAwaiter<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        observer: &'a dyn ProgressObserver,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transport,
            observer,
            poll_interval,
        }
    }

    /// Poll the task behind `handle` until it reaches a terminal state
    ///
    /// Returns the final representation of a succeeded task. A failed task
    /// becomes [`GatewayError::TaskFailed`]; a fired token becomes
    /// [`GatewayError::Cancelled`].
    pub async fn await_task(&self, cancel: &CancellationToken, handle: &Task) -> Result<Task> {
        let mut url = handle.poll_url().ok_or_else(|| GatewayError::MissingLink {
            resource: "task".to_string(),
            link: "self".to_string(),
        })?;
        let operation = format!("awaiting task {}", handle.id);
        let mut polls = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(GatewayError::Cancelled { operation });
            }

            polls += 1;
            let value = self
                .transport
                .send_cancellable(cancel, Request::get(&url), &operation)
                .await?;
            let task: Task = decode_response(value, Method::Get, &url)?;
            self.observer.task_polled(&task, polls);

            match task.state.outcome() {
                TaskOutcome::Succeeded => {
                    info!(task = %task.id, polls, "Task completed");
                    return Ok(task);
                }
                TaskOutcome::Failed => {
                    let task_id = if task.id.is_empty() {
                        handle.id.clone()
                    } else {
                        task.id.clone()
                    };
                    return Err(GatewayError::TaskFailed {
                        task_id,
                        state: task.state.as_str().to_string(),
                        detail: task.failure_detail(),
                    });
                }
                TaskOutcome::Pending => {}
            }

            if let Some(next) = task.poll_url() {
                url = next;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(GatewayError::Cancelled { operation });
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::models::TaskState;
    use crate::test_support::{
        Event, FakeTransport, HangingTransport, RecordingObserver, http_error, task_json,
    };
    use serde_json::json;

    fn handle() -> Task {
        serde_json::from_value(task_json("t1", "NOT_STARTED")).unwrap()
    }

    #[tokio::test]
    async fn test_pending_pending_succeeded() {
        let transport = FakeTransport::new()
            .respond_task("t1", "NOT_STARTED")
            .respond_task("t1", "IN_PROGRESS")
            .respond_task("t1", "COMPLETE");
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::ZERO);

        let task = awaiter
            .await_task(&CancellationToken::new(), &handle())
            .await
            .unwrap();

        assert_eq!(task.state, TaskState::Complete);
        assert_eq!(transport.request_count(), 3);
        assert!(transport.requests().iter().all(|r| r.method == Method::Get && r.url == "/task/t1"));
        assert_eq!(
            observer.events(),
            vec![
                Event::Poll(TaskState::NotStarted, 1),
                Event::Poll(TaskState::InProgress, 2),
                Event::Poll(TaskState::Complete, 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_pending_failed() {
        let transport = FakeTransport::new()
            .respond_task("t1", "IN_PROGRESS")
            .respond_ok(json!({"id": "t1", "state": "FAILED", "error": "disk full"}));
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::ZERO);

        let result = awaiter.await_task(&CancellationToken::new(), &handle()).await;

        match result {
            Err(GatewayError::TaskFailed {
                task_id,
                state,
                detail,
            }) => {
                assert_eq!(task_id, "t1");
                assert_eq!(state, "FAILED");
                assert_eq!(detail, "disk full");
            }
            other => panic!("expected task failure, got {:?}", other),
        }
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_poll() {
        let transport = FakeTransport::new().respond_task("t1", "COMPLETE");
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::ZERO);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = awaiter.await_task(&cancel, &handle()).await;

        assert!(matches!(result, Err(GatewayError::Cancelled { .. })));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_poll_interval() {
        let transport = FakeTransport::new()
            .respond_task("t1", "IN_PROGRESS")
            .respond_task("t1", "COMPLETE");
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::from_secs(60));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            canceller.cancel();
        });

        let result = awaiter.await_task(&cancel, &handle()).await;

        match result {
            Err(GatewayError::Cancelled { operation }) => {
                assert_eq!(operation, "awaiting task t1")
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_poll_interval_between_polls() {
        let transport = FakeTransport::new()
            .respond_task("t1", "IN_PROGRESS")
            .respond_task("t1", "IN_PROGRESS")
            .respond_task("t1", "COMPLETE");
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::from_secs(5));
        let start = tokio::time::Instant::now();

        awaiter
            .await_task(&CancellationToken::new(), &handle())
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11),
            "Expected two 5s pauses, got {:?}",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_while_request_in_flight() {
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&HangingTransport, &observer, Duration::ZERO);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let result = awaiter.await_task(&cancel, &handle()).await;
        assert!(matches!(result, Err(GatewayError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let transport = FakeTransport::new()
            .respond_task("t1", "IN_PROGRESS")
            .respond(Err(http_error(502)));
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::ZERO);

        let result = awaiter.await_task(&CancellationToken::new(), &handle()).await;

        assert!(matches!(result, Err(GatewayError::Http { status: 502, .. })));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_state_keeps_polling() {
        let transport = FakeTransport::new()
            .respond_task("t1", "PAUSED")
            .respond_task("t1", "COMPLETE");
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::ZERO);

        awaiter
            .await_task(&CancellationToken::new(), &handle())
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_completes_with_offsetless_timestamps() {
        let transport = FakeTransport::new().respond_ok(json!({
            "id": "t1",
            "publish_id": "p1",
            "state": "COMPLETE",
            "updated": "2024-01-01T00:00:00.123456",
            "deadline": null,
            "links": {"self": "/task/t1"}
        }));
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::ZERO);

        let task = awaiter
            .await_task(&CancellationToken::new(), &handle())
            .await
            .unwrap();

        assert_eq!(task.state, TaskState::Complete);
        assert!(task.updated.is_some());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_without_link_or_id() {
        let transport = FakeTransport::new();
        let observer = RecordingObserver::default();
        let awaiter = TaskAwaiter::new(&transport, &observer, Duration::ZERO);
        let handle: Task = serde_json::from_value(json!({"state": "NOT_STARTED"})).unwrap();

        let result = awaiter.await_task(&CancellationToken::new(), &handle).await;

        assert!(matches!(result, Err(GatewayError::MissingLink { .. })));
        assert_eq!(transport.request_count(), 0);
    }
}
