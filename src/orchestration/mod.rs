//! Orchestration layer for the publish lifecycle
//!
//! This module provides the components that drive a publish from creation
//! to a finished commit: batched item submission, the commit request and
//! the task polling that follows it.

pub mod batch_submitter;
pub mod commit;
pub mod dry_run;
pub mod progress;
pub mod session;
pub mod task_awaiter;

// Re-export main types for convenience
pub use batch_submitter::{BatchSubmitter, total_batches};
pub use commit::CommitCoordinator;
pub use dry_run::{DRY_RUN_PUBLISH_ID, DryRunPublish};
pub use progress::TracingObserver;
pub use session::{PublishSession, SessionSettings, resumed_links};
pub use task_awaiter::TaskAwaiter;
