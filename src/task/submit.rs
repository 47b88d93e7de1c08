//! Handing a validated configuration off to a background runner.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::TaskConfig;
use crate::params::{ParamsError, VideoParams};

use super::id::TaskId;
use super::log::{LogHub, LogLevel, LogLine, LogSubscription, TaskLogger};
use super::record::TaskRecord;
use super::runner::{TaskRunner, TaskRunnerError};

/// Why a submission was refused.  Nothing is spawned when this is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ParamsError),

    #[error("task id {0} was already submitted")]
    DuplicateTaskId(TaskId),
}

// ---------------------------------------------------------------------------
// TaskHandle
// ---------------------------------------------------------------------------

/// Caller's view of a submitted task.
pub struct TaskHandle {
    record: TaskRecord,
    hub: Arc<LogHub>,
    logs: Option<LogSubscription>,
    join: JoinHandle<Result<(), TaskRunnerError>>,
}

impl TaskHandle {
    pub fn task_id(&self) -> TaskId {
        self.record.task_id
    }

    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    /// The subscription attached before the start marker was emitted.  It
    /// sees every line of the task.  Returns `None` after the first call.
    pub fn take_logs(&mut self) -> Option<LogSubscription> {
        self.logs.take()
    }

    /// Attach another subscriber; it sees lines emitted from now on.
    pub fn subscribe(&self) -> LogSubscription {
        self.hub.subscribe()
    }

    /// Attach a callback subscriber; see [`LogHub::subscribe_fn`].
    pub fn subscribe_fn<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnMut(&LogLine) + Send + 'static,
    {
        self.hub.subscribe_fn(callback)
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the runner.  The log channel is closed by the time this
    /// returns.
    pub async fn wait(self) -> Result<(), TaskRunnerError> {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => Err(TaskRunnerError::Panicked(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TaskSubmitter
// ---------------------------------------------------------------------------

/// Validates configurations and starts them on a [`TaskRunner`].
///
/// Must be used from within a tokio runtime: every accepted submission is
/// spawned onto it.
///
/// Only ids of tasks that are still running are remembered; an id is
/// released when its task ends, so the set never outgrows the number of
/// in-flight tasks.
pub struct TaskSubmitter {
    runner: Arc<dyn TaskRunner>,
    redact_root: Option<PathBuf>,
    active: Arc<Mutex<HashSet<TaskId>>>,
}

impl TaskSubmitter {
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            runner,
            redact_root: None,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn from_config(runner: Arc<dyn TaskRunner>, config: &TaskConfig) -> Self {
        Self {
            redact_root: config.redact_root.clone(),
            ..Self::new(runner)
        }
    }

    /// Validate `params` and start a task with a fresh id.
    ///
    /// Validation happens before the id is generated, so a rejected
    /// submission leaves no trace.
    pub fn submit(&self, params: VideoParams) -> Result<TaskHandle, TaskError> {
        params.validate()?;
        self.start(TaskId::new(), params)
    }

    /// Like [`submit`](Self::submit) with a caller-chosen id.  The id must
    /// not belong to a task of this submitter that is still running.
    pub fn submit_with_id(
        &self,
        task_id: TaskId,
        params: VideoParams,
    ) -> Result<TaskHandle, TaskError> {
        params.validate()?;
        self.start(task_id, params)
    }

    /// Number of tasks started here that have not finished yet.
    pub fn active_count(&self) -> usize {
        lock_ids(&self.active).len()
    }

    fn start(&self, task_id: TaskId, params: VideoParams) -> Result<TaskHandle, TaskError> {
        if !lock_ids(&self.active).insert(task_id) {
            return Err(TaskError::DuplicateTaskId(task_id));
        }

        let record = TaskRecord::new(task_id, params);
        let hub = LogHub::new(task_id, self.redact_root.as_deref());
        let logs = hub.subscribe();

        hub.emit(LogLevel::Info, "starting video generation");
        match serde_json::to_string_pretty(record.params.as_ref()) {
            Ok(json) => hub.emit(LogLevel::Debug, format!("task params:\n{json}")),
            Err(e) => hub.emit(LogLevel::Warn, format!("could not serialise task params: {e}")),
        };

        let guard = TaskGuard {
            hub: Arc::clone(&hub),
            active: Arc::clone(&self.active),
            task_id,
            finished: false,
        };
        let join = tokio::spawn(run_task(Arc::clone(&self.runner), record.clone(), guard));

        log::info!("task {task_id} submitted");

        Ok(TaskHandle {
            record,
            hub,
            logs: Some(logs),
            join,
        })
    }
}

fn lock_ids(ids: &Mutex<HashSet<TaskId>>) -> std::sync::MutexGuard<'_, HashSet<TaskId>> {
    ids.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ends a task's bookkeeping however the runner exits.  If the runner never
/// reached its terminal line (it panicked), one is emitted here before the
/// hub closes.
struct TaskGuard {
    hub: Arc<LogHub>,
    active: Arc<Mutex<HashSet<TaskId>>>,
    task_id: TaskId,
    finished: bool,
}

impl TaskGuard {
    fn finish(&mut self, outcome: &Result<(), TaskRunnerError>) {
        match outcome {
            Ok(()) => self.hub.emit(LogLevel::Info, "task completed"),
            Err(e) => self.hub.emit(LogLevel::Error, format!("task failed: {e}")),
        };
        self.finished = true;
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.hub.emit(LogLevel::Error, "task failed: runner panicked");
            log::error!("task {} runner panicked", self.task_id);
        }
        self.hub.close();
        lock_ids(&self.active).remove(&self.task_id);
    }
}

async fn run_task(
    runner: Arc<dyn TaskRunner>,
    record: TaskRecord,
    mut guard: TaskGuard,
) -> Result<(), TaskRunnerError> {
    let logger = TaskLogger::new(Arc::clone(&guard.hub));

    let outcome = runner.run(&record, &logger).await;
    if let Err(e) = &outcome {
        log::warn!("task {} failed: {e}", record.task_id);
    }
    guard.finish(&outcome);

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
