//! Scripted collaborators for unit tests

use crate::core::error::{GatewayError, Result};
use crate::core::traits::{ProgressObserver, Request, Transport};
use crate::gateway::models::{ItemInput, Task, TaskState};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued responses in order and records every request
///
/// Once the queue is empty every request gets `Value::Null`.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    requests: Mutex<Vec<Request>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Result<Value>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn respond_ok(self, value: Value) -> Self {
        self.respond(Ok(value))
    }

    pub fn respond_task(self, id: &str, state: &str) -> Self {
        self.respond_ok(task_json(id, state))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: Request) -> Result<Value> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

/// Never answers; used to exercise cancellation of in-flight requests
pub struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn send(&self, _request: Request) -> Result<Value> {
        std::future::pending().await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Batch {
        current: usize,
        total: usize,
        size: usize,
    },
    Item(String),
    Commit(String),
    Poll(TaskState, usize),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressObserver for RecordingObserver {
    fn batch_started(&self, current: usize, total: usize, size: usize) {
        self.events.lock().unwrap().push(Event::Batch {
            current,
            total,
            size,
        });
    }

    fn item_queued(&self, item: &ItemInput, _url: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Item(item.web_uri.clone()));
    }

    fn commit_started(&self, publish_id: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Commit(publish_id.to_string()));
    }

    fn task_polled(&self, task: &Task, poll: usize) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Poll(task.state.clone(), poll));
    }
}

pub fn task_json(id: &str, state: &str) -> Value {
    json!({
        "id": id,
        "publish_id": "p1",
        "state": state,
        "links": {"self": format!("/task/{}", id)}
    })
}

pub fn items(count: usize) -> Vec<ItemInput> {
    (1..=count)
        .map(|i| ItemInput {
            web_uri: format!("/content/i{}", i),
            object_key: format!("{:064x}", i),
            content_type: "application/octet-stream".to_string(),
            link_to: String::new(),
        })
        .collect()
}

pub fn http_error(status: u16) -> GatewayError {
    GatewayError::Http {
        method: "PUT".to_string(),
        url: "/live/publish/p1".to_string(),
        status,
        body: "boom".to_string(),
    }
}
