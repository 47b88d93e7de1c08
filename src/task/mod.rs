//! Task submission and per-task progress logs.
//!
//! ```text
//! VideoParams ──TaskSubmitter::submit──▶ validate ─▶ TaskId ─▶ LogHub
//!                                                     │
//!                                 tokio::spawn(TaskRunner::run) ──▶ lines
//!                                                     │
//!                     TaskHandle ◀── LogSubscription / subscribe_fn
//! ```
//!
//! The runner works on an immutable snapshot.  When it returns, a final
//! `task completed` or `task failed: ...` line is emitted and the hub closes.

pub mod id;
pub mod log;
pub mod record;
pub mod runner;
pub mod submit;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use self::id::TaskId;
pub use self::log::{LogHub, LogLevel, LogLine, LogSubscription, TaskLogger};
pub use self::record::TaskRecord;
pub use self::runner::{DryRunRunner, TaskRunner, TaskRunnerError};
pub use self::submit::{TaskError, TaskHandle, TaskSubmitter};
