//! Task execution seam.
//!
//! [`TaskRunner`] is where the media pipeline plugs in.  [`DryRunRunner`]
//! walks the same stages and reports each one through the task log without
//! touching any media.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::assets;
use crate::config::{AssetConfig, TaskConfig};
use crate::params::{friendly_name, BgmType, VideoConcatMode, VideoParams};

use super::log::TaskLogger;
use super::record::TaskRecord;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure of a running task.  Callers only see it as the `task failed`
/// log line and as the handle's completion value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskRunnerError {
    #[error("{0}")]
    Failed(String),

    #[error("runner panicked: {0}")]
    Panicked(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Executes a submitted task, reporting progress through `log`.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(&self, task: &TaskRecord, log: &TaskLogger) -> Result<(), TaskRunnerError>;
}

// ---------------------------------------------------------------------------
// DryRunRunner
// ---------------------------------------------------------------------------

/// Logs what the media pipeline would do for each output video.
pub struct DryRunRunner {
    step_delay: Duration,
    song_dir: PathBuf,
}

impl DryRunRunner {
    pub fn new(step_delay: Duration, song_dir: PathBuf) -> Self {
        Self {
            step_delay,
            song_dir,
        }
    }

    pub fn from_config(task: &TaskConfig, assets: &AssetConfig) -> Self {
        Self::new(
            Duration::from_millis(task.dry_run_step_delay_ms),
            assets.song_dir.clone(),
        )
    }

    async fn pause(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }

    fn bgm_description(&self, params: &VideoParams) -> Result<String, TaskRunnerError> {
        match params.bgm_type {
            BgmType::None => Ok("no background music".into()),
            BgmType::Random => Ok(match assets::random_song(&self.song_dir) {
                Some(song) => format!(
                    "background music {} at volume {:.2}",
                    song.display(),
                    params.bgm_volume
                ),
                None => format!(
                    "no songs found in {}, continuing without background music",
                    self.song_dir.display()
                ),
            }),
            BgmType::Custom => match &params.bgm_file {
                Some(file) if file.is_file() => Ok(format!(
                    "background music {} at volume {:.2}",
                    file.display(),
                    params.bgm_volume
                )),
                Some(file) => Err(TaskRunnerError::Failed(format!(
                    "background music file not found: {}",
                    file.display()
                ))),
                None => Err(TaskRunnerError::Failed(
                    "custom background music selected but no file given".into(),
                )),
            },
        }
    }
}

#[async_trait]
impl TaskRunner for DryRunRunner {
    async fn run(&self, task: &TaskRecord, log: &TaskLogger) -> Result<(), TaskRunnerError> {
        let params = &task.params;
        let (width, height) = params.video_aspect.resolution();
        let total = params.video_count.max(1);

        if params.video_terms.is_empty() {
            log.info(format!(
                "no search terms given, deriving them from subject \"{}\"",
                params.video_subject
            ));
        } else {
            log.info(format!("search terms: {}", params.video_terms));
        }
        self.pause().await;

        for index in 1..=total {
            log.info(format!("video {index}/{total}: fetching clips"));
            log.debug(format!(
                "clip duration <= {}s, {} order",
                params.video_clip_duration,
                match params.video_concat_mode {
                    VideoConcatMode::Sequential => "sequential",
                    VideoConcatMode::Random => "random",
                }
            ));
            self.pause().await;

            log.info(format!(
                "video {index}/{total}: synthesizing voice ({})",
                friendly_name(&params.voice_name)
            ));
            self.pause().await;

            if params.subtitle_enabled {
                log.info(format!(
                    "video {index}/{total}: subtitles with {} {}px {} at {}",
                    params.font_name,
                    params.font_size,
                    params.text_fore_color,
                    params.subtitle_position.as_str()
                ));
            } else {
                log.info(format!("video {index}/{total}: subtitles disabled"));
            }
            self.pause().await;

            log.info(format!(
                "video {index}/{total}: {}",
                self.bgm_description(params)?
            ));
            self.pause().await;

            log.info(format!(
                "video {index}/{total}: rendering {width}x{height} ({})",
                params.video_aspect.ratio()
            ));
            self.pause().await;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// Runner that logs fixed lines and then succeeds or fails as configured.
#[cfg(test)]
pub struct MockRunner {
    lines: Vec<String>,
    outcome: Result<(), TaskRunnerError>,
    delay: Duration,
}

#[cfg(test)]
impl MockRunner {
    pub fn ok(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            outcome: Ok(()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            lines: Vec::new(),
            outcome: Err(TaskRunnerError::Failed(message.into())),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[cfg(test)]
#[async_trait]
impl TaskRunner for MockRunner {
    async fn run(&self, _task: &TaskRecord, log: &TaskLogger) -> Result<(), TaskRunnerError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        for line in &self.lines {
            log.info(line.clone());
        }
        self.outcome.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::VideoTerms;
    use crate::task::id::TaskId;
    use crate::task::log::LogHub;

    fn record(params: VideoParams) -> TaskRecord {
        TaskRecord::new(TaskId::new(), params)
    }

    async fn run_dry(params: VideoParams, song_dir: PathBuf) -> (Result<(), TaskRunnerError>, Vec<String>) {
        let task = record(params);
        let hub = LogHub::new(task.task_id, None);
        let sub = hub.subscribe();
        let runner = DryRunRunner::new(Duration::ZERO, song_dir);
        let result = runner.run(&task, &TaskLogger::new(hub.clone())).await;
        hub.close();
        let lines = sub.collect().await.into_iter().map(|l| l.message).collect();
        (result, lines)
    }

    #[tokio::test]
    async fn dry_run_walks_every_stage_per_video() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = VideoParams::new();
        params.set_subject("history of coffee");
        params.video_terms = VideoTerms::parse("coffee, ethiopia, beans");
        params.video_count = 2;
        params.bgm_type = BgmType::None;

        let (result, lines) = run_dry(params, dir.path().to_path_buf()).await;
        assert!(result.is_ok());
        assert_eq!(lines[0], "search terms: coffee, ethiopia, beans");
        assert!(lines.iter().any(|l| l.starts_with("video 2/2: rendering 1080x1920")));
        assert_eq!(
            lines.iter().filter(|l| l.contains("fetching clips")).count(),
            2
        );
    }

    #[tokio::test]
    async fn random_bgm_uses_song_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("calm.mp3"), b"").unwrap();
        let mut params = VideoParams::new();
        params.set_subject("rain");
        params.bgm_type = BgmType::Random;

        let (result, lines) = run_dry(params, dir.path().to_path_buf()).await;
        assert!(result.is_ok());
        assert!(lines.iter().any(|l| l.contains("calm.mp3")), "{lines:?}");
    }

    #[tokio::test]
    async fn missing_custom_bgm_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = VideoParams::new();
        params.set_subject("rain");
        params.bgm_type = BgmType::Custom;
        params.bgm_file = Some(dir.path().join("gone.mp3"));

        let (result, _) = run_dry(params, dir.path().to_path_buf()).await;
        assert!(matches!(result, Err(TaskRunnerError::Failed(m)) if m.contains("gone.mp3")));
    }

    #[tokio::test]
    async fn disabled_subtitles_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = VideoParams::new();
        params.set_subject("rain");
        params.subtitle_enabled = false;
        params.bgm_type = BgmType::None;

        let (_, lines) = run_dry(params, dir.path().to_path_buf()).await;
        assert!(lines.contains(&"video 1/1: subtitles disabled".to_string()));
    }
}
