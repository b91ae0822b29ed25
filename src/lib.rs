pub mod core;
pub mod gateway;
pub mod orchestration;
pub mod security;

#[cfg(test)]
mod test_support;

pub use crate::core::*;
pub use gateway::{GatewayClient, HttpTransport, ItemInput, PublishRecord, Task, TaskState};
pub use orchestration::{DryRunPublish, PublishSession, TracingObserver};
pub use security::GatewayTokenManager;
