//! The per-task configuration model.
//!
//! * [`VideoParams`] — one record describing a whole video-generation task.
//! * [`VideoTerms`] — ordered, deduplicated search keywords.
//! * [`HexColor`] / [`SubtitlePosition`] — subtitle styling.
//! * [`voice`] — the catalog of narration voices.
//! * [`ParamsError`] — failures of the caller-triggered checks.

pub mod subtitle;
pub mod terms;
pub mod video;
pub mod voice;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use subtitle::{HexColor, SubtitlePosition};
pub use terms::VideoTerms;
pub use video::{BgmType, ParamsError, VideoAspect, VideoConcatMode, VideoLanguage, VideoParams};
pub use voice::{find_voice, friendly_name, VoiceInfo, VOICES};
