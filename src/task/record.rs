use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::params::VideoParams;

use super::id::TaskId;

/// A submitted task: its id plus the parameter snapshot taken at submission.
///
/// The snapshot is shared read-only with the runner; edits the caller makes
/// to its own `VideoParams` afterwards never reach it.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub params: Arc<VideoParams>,
    pub submitted_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new(task_id: TaskId, params: VideoParams) -> Self {
        Self {
            task_id,
            params: Arc::new(params),
            submitted_at: Utc::now(),
        }
    }
}
