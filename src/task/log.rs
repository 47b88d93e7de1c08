//! Per-task log channel.
//!
//! Every submitted task gets its own [`LogHub`]: an append-only sequence of
//! [`LogLine`]s fanned out to any number of subscribers.
//!
//! * Each subscriber has its own unbounded queue, so producers never wait on
//!   a slow reader and a reader never misses a line emitted after it
//!   subscribed.
//! * Sequence numbers are assigned and lines fanned out under one lock, so
//!   every subscriber sees the same gapless order.
//! * [`LogHub::close`] ends the stream: queued lines are still delivered,
//!   then `recv()` returns `None` for every subscriber.
//!
//! Lines are also forwarded to the `log` facade under the
//! `video_studio::task` target.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::id::TaskId;

const LOG_TARGET: &str = "video_studio::task";

// ---------------------------------------------------------------------------
// LogLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// LogLine
// ---------------------------------------------------------------------------

/// One progress line of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    /// Position in the task's stream, starting at 0.
    pub seq: u64,
    pub task_id: TaskId,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:<5} | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level.as_str(),
            self.message
        )
    }
}

// ---------------------------------------------------------------------------
// LogHub
// ---------------------------------------------------------------------------

struct HubInner {
    next_seq: u64,
    subscribers: Vec<mpsc::UnboundedSender<LogLine>>,
    closed: bool,
}

/// Fan-out point for one task's log lines.
pub struct LogHub {
    task_id: TaskId,
    redact_root: Option<String>,
    inner: Mutex<HubInner>,
}

impl LogHub {
    /// Create a hub for `task_id`.  Occurrences of `redact_root` in messages
    /// are replaced by `.`.
    pub fn new(task_id: TaskId, redact_root: Option<&Path>) -> Arc<Self> {
        let redact_root = redact_root
            .map(|p| p.to_string_lossy().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        Arc::new(Self {
            task_id,
            redact_root,
            inner: Mutex::new(HubInner {
                next_seq: 0,
                subscribers: Vec::new(),
                closed: false,
            }),
        })
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Register a subscriber.  It receives every line emitted from now on.
    /// Subscribing to a closed hub yields an already-finished subscription.
    pub fn subscribe(&self) -> LogSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        if !inner.closed {
            inner.subscribers.push(tx);
        }
        LogSubscription { rx }
    }

    /// Register a callback invoked once per line, in order, on a spawned
    /// tokio task.  The task ends when the hub closes.
    pub fn subscribe_fn<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(&LogLine) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        tokio::spawn(async move {
            while let Some(line) = subscription.recv().await {
                callback(&line);
            }
        })
    }

    /// Append a line.  Returns its sequence number, or `None` once the hub
    /// is closed.
    pub fn emit(&self, level: LogLevel, message: impl Into<String>) -> Option<u64> {
        let message = self.redact(message.into());

        let mut inner = self.lock();
        if inner.closed {
            log::debug!(target: LOG_TARGET, "[{}] dropped after close: {message}", self.task_id);
            return None;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;

        log::log!(target: LOG_TARGET, log::Level::from(level), "[{}] {message}", self.task_id);

        let line = LogLine {
            seq,
            task_id: self.task_id,
            level,
            message,
            timestamp: Utc::now(),
        };
        // Receivers that were dropped are pruned here.
        inner
            .subscribers
            .retain(|tx| tx.send(line.clone()).is_ok());

        Some(seq)
    }

    /// End the stream for every subscriber.  Idempotent.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn redact(&self, message: String) -> String {
        match &self.redact_root {
            Some(root) if message.contains(root.as_str()) => message.replace(root.as_str(), "."),
            _ => message,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// LogSubscription
// ---------------------------------------------------------------------------

/// Receiving end of one subscriber.
pub struct LogSubscription {
    rx: mpsc::UnboundedReceiver<LogLine>,
}

impl LogSubscription {
    /// Next line, or `None` once the hub is closed and the queue is drained.
    pub async fn recv(&mut self) -> Option<LogLine> {
        self.rx.recv().await
    }

    /// Next line if one is already queued.
    pub fn try_recv(&mut self) -> Option<LogLine> {
        self.rx.try_recv().ok()
    }

    /// Collect every remaining line until the hub closes.
    pub async fn collect(mut self) -> Vec<LogLine> {
        let mut lines = Vec::new();
        while let Some(line) = self.rx.recv().await {
            lines.push(line);
        }
        lines
    }
}

// ---------------------------------------------------------------------------
// TaskLogger
// ---------------------------------------------------------------------------

/// Write-only handle given to task runners.
#[derive(Clone)]
pub struct TaskLogger {
    hub: Arc<LogHub>,
}

impl TaskLogger {
    pub fn new(hub: Arc<LogHub>) -> Self {
        Self { hub }
    }

    pub fn task_id(&self) -> TaskId {
        self.hub.task_id()
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.hub.emit(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.hub.emit(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.hub.emit(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.hub.emit(LogLevel::Error, message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
