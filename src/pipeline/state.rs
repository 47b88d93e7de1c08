//! Draft state machine for the script → terms generation stages.
//!
//! A [`Draft`] owns the [`VideoParams`] being edited and tracks which
//! generation stage the draft has reached:
//!
//! ```text
//! NoScript ──script set──▶ HasScript ──terms derived──▶ HasTerms
//!     ▲                        ▲                           │
//!     └──script cleared────────┴────script changed─────────┘
//! ```
//!
//! Terms are only derived from `HasScript` or `HasTerms`.  Changing the
//! script after terms exist keeps the terms but marks them stale, which moves
//! the draft back to `HasScript`.

use crate::params::{VideoParams, VideoTerms};

// ---------------------------------------------------------------------------
// DraftStage
// ---------------------------------------------------------------------------

/// How far the draft has progressed through generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftStage {
    /// No script yet; terms cannot be derived.
    #[default]
    NoScript,
    /// A script exists; terms are missing or stale.
    HasScript,
    /// Terms exist and match the current script.
    HasTerms,
}

impl DraftStage {
    /// Whether search terms may be derived from this stage.
    ///
    /// ```
    /// use video_studio::pipeline::DraftStage;
    ///
    /// assert!(!DraftStage::NoScript.can_generate_terms());
    /// assert!(DraftStage::HasScript.can_generate_terms());
    /// assert!(DraftStage::HasTerms.can_generate_terms());
    /// ```
    pub fn can_generate_terms(&self) -> bool {
        !matches!(self, DraftStage::NoScript)
    }

    /// A short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DraftStage::NoScript => "No script",
            DraftStage::HasScript => "Script ready",
            DraftStage::HasTerms => "Terms ready",
        }
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// The caller-owned configuration of a task that has not been submitted yet.
///
/// Script and terms changes go through [`set_script`](Self::set_script),
/// [`set_terms`](Self::set_terms) or [`edit`](Self::edit) so the stage stays
/// accurate.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    params: VideoParams,
    terms_stale: bool,
}

impl Draft {
    /// Wrap existing params.  Terms that came with the params are trusted to
    /// match their script.
    pub fn new(params: VideoParams) -> Self {
        Self {
            params,
            terms_stale: false,
        }
    }

    pub fn params(&self) -> &VideoParams {
        &self.params
    }

    /// Hand the params over for submission.
    pub fn into_params(self) -> VideoParams {
        self.params
    }

    pub fn stage(&self) -> DraftStage {
        if self.params.video_script.trim().is_empty() {
            DraftStage::NoScript
        } else if self.params.video_terms.is_empty() || self.terms_stale {
            DraftStage::HasScript
        } else {
            DraftStage::HasTerms
        }
    }

    /// `true` when terms exist but the script changed after they were set.
    pub fn terms_stale(&self) -> bool {
        self.terms_stale && !self.params.video_terms.is_empty()
    }

    /// Replace the script (manual edit or a generated one).
    pub fn set_script(&mut self, script: impl Into<String>) {
        let script = script.into();
        if script != self.params.video_script {
            self.params.video_script = script;
            self.terms_stale = !self.params.video_terms.is_empty();
        }
    }

    /// Replace the terms; they now belong to the current script.
    pub fn set_terms(&mut self, terms: VideoTerms) {
        self.params.video_terms = terms;
        self.terms_stale = false;
    }

    /// Edit any field of the params.  Script and terms changes made inside
    /// the closure are detected and update the stage like the setters do.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut VideoParams) -> R) -> R {
        let script_before = self.params.video_script.clone();
        let terms_before = self.params.video_terms.clone();

        let out = f(&mut self.params);

        if self.params.video_terms != terms_before {
            self.terms_stale = false;
        } else if self.params.video_script != script_before {
            self.terms_stale = !self.params.video_terms.is_empty();
        }
        out
    }
}

impl From<VideoParams> for Draft {
    fn from(params: VideoParams) -> Self {
        Self::new(params)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_draft_has_no_script() {
        let draft = Draft::default();
        assert_eq!(draft.stage(), DraftStage::NoScript);
        assert!(!draft.terms_stale());
    }

    #[test]
    fn blank_script_counts_as_no_script() {
        let mut draft = Draft::default();
        draft.set_script("   \n");
        assert_eq!(draft.stage(), DraftStage::NoScript);
    }

    #[test]
    fn script_then_terms_reaches_has_terms() {
        let mut draft = Draft::default();
        draft.set_script("Coffee began in Ethiopia.");
        assert_eq!(draft.stage(), DraftStage::HasScript);

        draft.set_terms(VideoTerms::parse("coffee, ethiopia"));
        assert_eq!(draft.stage(), DraftStage::HasTerms);
    }

    #[test]
    fn changing_script_marks_terms_stale_but_keeps_them() {
        let mut draft = Draft::default();
        draft.set_script("Coffee began in Ethiopia.");
        draft.set_terms(VideoTerms::parse("coffee, ethiopia"));

        draft.set_script("Tea began in China.");
        assert_eq!(draft.stage(), DraftStage::HasScript);
        assert!(draft.terms_stale());
        assert_eq!(draft.params().video_terms.joined(), "coffee, ethiopia");
    }

    #[test]
    fn setting_identical_script_keeps_terms_fresh() {
        let mut draft = Draft::default();
        draft.set_script("Same.");
        draft.set_terms(VideoTerms::parse("same"));
        draft.set_script("Same.");
        assert_eq!(draft.stage(), DraftStage::HasTerms);
    }

    #[test]
    fn edit_detects_script_changes() {
        let mut draft = Draft::default();
        draft.set_script("One.");
        draft.set_terms(VideoTerms::parse("one"));

        draft.edit(|p| p.video_count = 3);
        assert_eq!(draft.stage(), DraftStage::HasTerms);

        draft.edit(|p| p.video_script.push_str(" Two."));
        assert!(draft.terms_stale());

        draft.edit(|p| p.set_terms_joined("one, two"));
        assert_eq!(draft.stage(), DraftStage::HasTerms);
    }

    #[test]
    fn clearing_script_returns_to_no_script() {
        let mut draft = Draft::default();
        draft.set_script("One.");
        draft.set_terms(VideoTerms::parse("one"));
        draft.set_script("");
        assert_eq!(draft.stage(), DraftStage::NoScript);
    }

    #[test]
    fn params_with_script_and_terms_start_at_has_terms() {
        let mut params = VideoParams::default();
        params.video_script = "Script.".into();
        params.set_terms_joined("a, b");
        assert_eq!(Draft::from(params).stage(), DraftStage::HasTerms);
    }

    #[test]
    fn labels() {
        assert_eq!(DraftStage::NoScript.label(), "No script");
        assert_eq!(DraftStage::HasScript.label(), "Script ready");
        assert_eq!(DraftStage::HasTerms.label(), "Terms ready");
    }
}
