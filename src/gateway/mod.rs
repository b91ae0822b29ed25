//! Gateway access: wire types, the HTTP transport and the client factory

pub mod client;
pub mod http;
pub mod models;

pub use client::GatewayClient;
pub use http::{HttpTransport, IDEMPOTENCY_KEY_HEADER};
pub use models::{ItemInput, PublishRecord, Task, TaskOutcome, TaskState};
