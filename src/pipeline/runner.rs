//! Generation pipeline: drives the script → terms stages against a backend.
//!
//! [`GenerationPipeline`] wraps an `Arc<dyn ScriptGenerator>` and bounds every
//! backend call with a timeout and a [`CancellationToken`].
//!
//! # Flow
//!
//! ```text
//! generate_script(draft)            [any stage]
//!   └─▶ backend.generate_script     ─▶ draft.set_script   (terms kept, stale)
//!
//! generate_terms(draft)             [HasScript | HasTerms]
//!   └─▶ backend.generate_terms      ─▶ draft.set_terms
//!   NoScript ─▶ Err(EmptyScript), backend never called
//!
//! generate_script_and_terms(draft)
//!   └─▶ script ─▶ terms(new script) ─▶ commit both, or neither
//! ```
//!
//! On any error the draft is left exactly as it was.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::GenerationConfig;
use crate::llm::{LlmError, ScriptGenerator};
use crate::params::{VideoLanguage, VideoTerms};

use super::state::Draft;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Errors that can surface from a generation stage.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Terms were requested while there is no script.  Raised before any
    /// backend call.
    #[error("the video script is empty; write or generate a script first")]
    EmptyScript,

    /// The backend call failed.
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),

    /// The stage did not finish within the configured bound.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the stage.
    #[error("generation cancelled")]
    Cancelled,
}

// ---------------------------------------------------------------------------
// GenerationPipeline
// ---------------------------------------------------------------------------

/// Runs the generation stages.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use video_studio::config::AppConfig;
/// use video_studio::llm::ApiGenerator;
/// use video_studio::pipeline::{Draft, GenerationPipeline};
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let generator = Arc::new(ApiGenerator::from_config(&config.llm, &config.generation));
/// let pipeline = GenerationPipeline::from_config(generator, &config.generation);
///
/// let mut draft = Draft::default();
/// draft.edit(|p| p.set_subject("history of coffee"));
///
/// let cancel = CancellationToken::new();
/// pipeline.generate_script_and_terms(&mut draft, &cancel).await.unwrap();
/// # }
/// ```
pub struct GenerationPipeline {
    generator: Arc<dyn ScriptGenerator>,
    timeout: Duration,
}

impl GenerationPipeline {
    pub fn new(generator: Arc<dyn ScriptGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub fn from_config(generator: Arc<dyn ScriptGenerator>, config: &GenerationConfig) -> Self {
        Self::new(generator, Duration::from_secs(config.timeout_secs))
    }

    // -----------------------------------------------------------------------
    // Stateless stages
    // -----------------------------------------------------------------------

    /// Generate a script for `subject`.
    ///
    /// An empty subject is passed through; the backend decides what to do
    /// with it.
    pub async fn script_for(
        &self,
        subject: &str,
        language: VideoLanguage,
        cancel: &CancellationToken,
    ) -> Result<String, PipelineError> {
        log::info!(
            "pipeline: generating script (subject={subject:?}, language={:?})",
            language.code()
        );
        self.bounded(self.generator.generate_script(subject, language), cancel)
            .await
    }

    /// Generate search terms for `subject` and `script`.
    ///
    /// Fails with [`PipelineError::EmptyScript`] without contacting the
    /// backend when `script` is blank.
    pub async fn terms_for(
        &self,
        subject: &str,
        script: &str,
        cancel: &CancellationToken,
    ) -> Result<VideoTerms, PipelineError> {
        if script.trim().is_empty() {
            return Err(PipelineError::EmptyScript);
        }
        log::info!("pipeline: generating terms (subject={subject:?})");
        let terms = self
            .bounded(self.generator.generate_terms(subject, script), cancel)
            .await?;
        if terms.is_empty() {
            return Err(PipelineError::Generation(LlmError::EmptyResponse));
        }
        Ok(terms)
    }

    // -----------------------------------------------------------------------
    // Draft stages
    // -----------------------------------------------------------------------

    /// Generate a script from the draft's subject and language and store it.
    ///
    /// Existing terms are kept (and become stale).
    pub async fn generate_script(
        &self,
        draft: &mut Draft,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        let params = draft.params();
        let script = self
            .script_for(&params.video_subject, params.video_language, cancel)
            .await?;
        draft.set_script(script);
        Ok(())
    }

    /// Derive terms from the draft's current script and store them.
    pub async fn generate_terms(
        &self,
        draft: &mut Draft,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        if !draft.stage().can_generate_terms() {
            return Err(PipelineError::EmptyScript);
        }
        let params = draft.params();
        let terms = self
            .terms_for(&params.video_subject, &params.video_script, cancel)
            .await?;
        draft.set_terms(terms);
        Ok(())
    }

    /// Generate a script, then terms from that script.  Both are stored only
    /// when both stages succeed.
    pub async fn generate_script_and_terms(
        &self,
        draft: &mut Draft,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        let params = draft.params();
        let subject = params.video_subject.clone();

        let script = self
            .script_for(&subject, params.video_language, cancel)
            .await?;
        let terms = self.terms_for(&subject, &script, cancel).await?;

        draft.set_script(script);
        draft.set_terms(terms);
        log::info!("pipeline: script and terms ready");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn bounded<T, F>(&self, call: F, cancel: &CancellationToken) -> Result<T, PipelineError>
    where
        F: std::future::Future<Output = Result<T, LlmError>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::warn!("pipeline: generation cancelled");
                Err(PipelineError::Cancelled)
            }
            outcome = tokio::time::timeout(self.timeout, call) => match outcome {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => {
                    log::error!("pipeline: generation failed: {e}");
                    Err(PipelineError::Generation(e))
                }
                Err(_) => {
                    log::error!("pipeline: generation timed out after {:?}", self.timeout);
                    Err(PipelineError::Timeout(self.timeout))
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockGenerator;
    use crate::pipeline::DraftStage;

    fn pipeline_with(mock: Arc<MockGenerator>) -> GenerationPipeline {
        GenerationPipeline::new(mock, Duration::from_secs(5))
    }

    fn draft_with_subject(subject: &str) -> Draft {
        let mut draft = Draft::default();
        draft.edit(|p| p.set_subject(subject));
        draft
    }

    #[tokio::test]
    async fn terms_with_empty_script_fail_without_backend_call() {
        let mock = Arc::new(MockGenerator::ok("unused", &["unused"]));
        let pipeline = pipeline_with(Arc::clone(&mock));
        let mut draft = draft_with_subject("history of coffee");
        let cancel = CancellationToken::new();

        let err = pipeline.generate_terms(&mut draft, &cancel).await.unwrap_err();

        assert!(matches!(err, PipelineError::EmptyScript));
        assert_eq!(mock.terms_calls(), 0);
        assert!(draft.params().video_terms.is_empty());

        let err = pipeline.terms_for("subject", "  ", &cancel).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyScript));
        assert_eq!(mock.terms_calls(), 0);
    }

    #[tokio::test]
    async fn script_then_terms_produces_non_empty_terms() {
        let mock = Arc::new(MockGenerator::ok(
            "Coffee began in Ethiopia...",
            &["coffee", "ethiopia", "beans"],
        ));
        let pipeline = pipeline_with(Arc::clone(&mock));
        let mut draft = draft_with_subject("history of coffee");
        let cancel = CancellationToken::new();

        pipeline.generate_script(&mut draft, &cancel).await.unwrap();
        assert_eq!(draft.stage(), DraftStage::HasScript);

        pipeline.generate_terms(&mut draft, &cancel).await.unwrap();
        assert_eq!(draft.stage(), DraftStage::HasTerms);
        assert!(!draft.params().video_terms.is_empty());
        assert_eq!(mock.script_calls(), 1);
        assert_eq!(mock.terms_calls(), 1);
    }

    #[tokio::test]
    async fn script_failure_leaves_prior_script_untouched() {
        let mock = Arc::new(MockGenerator::with(
            Err(LlmError::Quota("slow down".into())),
            Ok(VideoTerms::parse("x")),
        ));
        let pipeline = pipeline_with(mock);
        let mut draft = draft_with_subject("history of coffee");
        draft.set_script("Hand-written script.");
        draft.set_terms(VideoTerms::parse("hand, picked"));
        let cancel = CancellationToken::new();

        let err = pipeline.generate_script(&mut draft, &cancel).await.unwrap_err();

        assert!(matches!(err, PipelineError::Generation(LlmError::Quota(_))));
        assert_eq!(draft.params().video_script, "Hand-written script.");
        assert_eq!(draft.params().video_terms.joined(), "hand, picked");
        assert_eq!(draft.stage(), DraftStage::HasTerms);
    }

    #[tokio::test]
    async fn regenerating_script_keeps_curated_terms() {
        let mock = Arc::new(MockGenerator::ok("A new script.", &["fresh"]));
        let pipeline = pipeline_with(mock);
        let mut draft = draft_with_subject("oceans");
        draft.set_script("Old script.");
        draft.set_terms(VideoTerms::parse("curated, terms"));
        let cancel = CancellationToken::new();

        pipeline.generate_script(&mut draft, &cancel).await.unwrap();

        assert_eq!(draft.params().video_script, "A new script.");
        assert_eq!(draft.params().video_terms.joined(), "curated, terms");
        assert!(draft.terms_stale());
    }

    #[tokio::test]
    async fn combined_action_commits_nothing_when_terms_fail() {
        let mock = Arc::new(MockGenerator::with(
            Ok("Generated script.".into()),
            Err(LlmError::EmptyResponse),
        ));
        let pipeline = pipeline_with(Arc::clone(&mock));
        let mut draft = draft_with_subject("volcanoes");
        let cancel = CancellationToken::new();

        let err = pipeline
            .generate_script_and_terms(&mut draft, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Generation(LlmError::EmptyResponse)));
        assert!(draft.params().video_script.is_empty());
        assert_eq!(draft.stage(), DraftStage::NoScript);
        assert_eq!(mock.terms_calls(), 1);
    }

    #[tokio::test]
    async fn combined_action_fills_script_and_terms() {
        let mock = Arc::new(MockGenerator::ok(
            "Coffee began in Ethiopia...",
            &["coffee", "ethiopia", "beans"],
        ));
        let pipeline = pipeline_with(mock);
        let mut draft = draft_with_subject("history of coffee");
        let cancel = CancellationToken::new();

        pipeline
            .generate_script_and_terms(&mut draft, &cancel)
            .await
            .unwrap();

        assert_eq!(draft.params().video_script, "Coffee began in Ethiopia...");
        assert_eq!(draft.params().video_terms.joined(), "coffee, ethiopia, beans");
        assert_eq!(draft.stage(), DraftStage::HasTerms);
    }

    #[tokio::test]
    async fn empty_terms_from_backend_are_an_error() {
        let mock = Arc::new(MockGenerator::with(Ok("s".into()), Ok(VideoTerms::default())));
        let pipeline = pipeline_with(mock);
        let cancel = CancellationToken::new();

        let err = pipeline.terms_for("s", "script", &cancel).await.unwrap_err();
        assert!(matches!(err, PipelineError::Generation(LlmError::EmptyResponse)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let mock = Arc::new(
            MockGenerator::ok("late", &["late"]).delayed(Duration::from_secs(30)),
        );
        let pipeline = GenerationPipeline::new(mock, Duration::from_secs(1));
        let mut draft = draft_with_subject("patience");
        let cancel = CancellationToken::new();

        let err = pipeline.generate_script(&mut draft, &cancel).await.unwrap_err();

        assert!(matches!(err, PipelineError::Timeout(d) if d == Duration::from_secs(1)));
        assert!(draft.params().video_script.is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_aborts_stage() {
        let mock = Arc::new(
            MockGenerator::ok("never", &["never"]).delayed(Duration::from_secs(30)),
        );
        let pipeline = pipeline_with(mock);
        let mut draft = draft_with_subject("abort");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipeline.generate_script(&mut draft, &cancel).await.unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert!(draft.params().video_script.is_empty());
    }
}
