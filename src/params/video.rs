//! `VideoParams`: every parameter needed to run one video-generation task.
//!
//! A plain mutable record.  Construction and field assignment have no side
//! effects; checks run only when the caller asks for them:
//!
//! * [`VideoParams::validate`] — the subject/script invariant enforced before
//!   a task is submitted.
//! * [`VideoParams::check_ranges`] — per-field bounds, used when a task file
//!   is loaded from disk.
//! * [`VideoParams::check_font`] — the font must be one that was discovered.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::subtitle::{HexColor, SubtitlePosition};
use super::terms::VideoTerms;
use super::voice;

// ---------------------------------------------------------------------------
// ParamsError
// ---------------------------------------------------------------------------

/// Errors raised by checks on [`VideoParams`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    /// The one invariant enforced at submission time.
    #[error("video subject and video script cannot both be empty")]
    EmptySubjectAndScript,

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("bgm volume {0} is not a multiple of 0.1")]
    VolumeStep(f32),

    #[error("aspect ratio {0} is not supported")]
    UnsupportedAspect(&'static str),

    #[error("unknown voice: {0}")]
    UnknownVoice(String),

    #[error("unknown font: {0}")]
    UnknownFont(String),

    #[error("background music file not found: {0}")]
    BgmNotFound(PathBuf),

    #[error("custom background music selected but no file set")]
    MissingBgmFile,

    #[error("invalid colour {0:?}, expected #RRGGBB")]
    InvalidColor(String),
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Language the script is generated in.  `Auto` (the empty string on the
/// wire) lets the backend infer it from the subject text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoLanguage {
    #[default]
    #[serde(rename = "")]
    Auto,
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "en-US")]
    EnUs,
}

impl VideoLanguage {
    pub const ALL: [VideoLanguage; 4] = [
        VideoLanguage::Auto,
        VideoLanguage::ZhCn,
        VideoLanguage::ZhTw,
        VideoLanguage::EnUs,
    ];

    /// Wire value; empty for auto-detect.
    pub fn code(&self) -> &'static str {
        match self {
            VideoLanguage::Auto => "",
            VideoLanguage::ZhCn => "zh-CN",
            VideoLanguage::ZhTw => "zh-TW",
            VideoLanguage::EnUs => "en-US",
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code.trim())
    }
}

/// How source clips are ordered during assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoConcatMode {
    Sequential,
    #[default]
    Random,
}

/// Output frame shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoAspect {
    /// 9:16, short-video platforms.
    #[default]
    #[serde(rename = "9:16")]
    Portrait,
    /// 16:9.
    #[serde(rename = "16:9")]
    Landscape,
    /// 1:1, reserved: rejected by `check_ranges`.
    #[serde(rename = "1:1")]
    Square,
}

impl VideoAspect {
    pub fn ratio(&self) -> &'static str {
        match self {
            VideoAspect::Portrait => "9:16",
            VideoAspect::Landscape => "16:9",
            VideoAspect::Square => "1:1",
        }
    }

    /// Output resolution `(width, height)` in pixels.
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            VideoAspect::Portrait => (1080, 1920),
            VideoAspect::Landscape => (1920, 1080),
            VideoAspect::Square => (1080, 1080),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, VideoAspect::Square)
    }
}

/// Background-music source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BgmType {
    #[serde(rename = "")]
    None,
    #[default]
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "custom")]
    Custom,
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

pub const CLIP_DURATION_RANGE: (u32, u32) = (2, 6);
pub const VIDEO_COUNT_RANGE: (u32, u32) = (1, 5);
pub const FONT_SIZE_RANGE: (u32, u32) = (30, 100);
pub const STROKE_WIDTH_RANGE: (f32, f32) = (0.0, 10.0);
pub const BGM_VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

// ---------------------------------------------------------------------------
// VideoParams
// ---------------------------------------------------------------------------

/// Configuration of one video-generation task.
///
/// Owned by the caller until it is submitted; submission takes an immutable
/// snapshot so later edits never reach a running task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoParams {
    /// Free-text topic, stored trimmed.
    pub video_subject: String,
    pub video_language: VideoLanguage,
    /// Narration text, user-authored or generated.
    pub video_script: String,
    pub video_terms: VideoTerms,
    pub video_concat_mode: VideoConcatMode,
    pub video_aspect: VideoAspect,
    /// Maximum length of one source clip, in seconds.
    pub video_clip_duration: u32,
    /// Number of independent videos rendered from the same inputs.
    pub video_count: u32,

    pub voice_name: String,

    pub bgm_type: BgmType,
    /// Set only when `bgm_type == Custom`.
    pub bgm_file: Option<PathBuf>,
    pub bgm_volume: f32,

    /// When false the remaining subtitle fields are kept but unused.
    pub subtitle_enabled: bool,
    pub font_name: String,
    pub subtitle_position: SubtitlePosition,
    pub text_fore_color: HexColor,
    pub font_size: u32,
    pub stroke_color: HexColor,
    pub stroke_width: f32,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            video_subject: String::new(),
            video_language: VideoLanguage::Auto,
            video_script: String::new(),
            video_terms: VideoTerms::default(),
            video_concat_mode: VideoConcatMode::Random,
            video_aspect: VideoAspect::Portrait,
            video_clip_duration: 3,
            video_count: 1,
            voice_name: voice::default_voice().to_string(),
            bgm_type: BgmType::Random,
            bgm_file: None,
            bgm_volume: 0.2,
            subtitle_enabled: true,
            font_name: String::new(),
            subtitle_position: SubtitlePosition::Bottom,
            text_fore_color: HexColor::WHITE,
            font_size: 60,
            stroke_color: HexColor::BLACK,
            stroke_width: 1.5,
        }
    }
}

impl VideoParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the topic; surrounding whitespace is dropped.
    pub fn set_subject(&mut self, subject: &str) {
        self.video_subject = subject.trim().to_string();
    }

    /// Replace the terms from their comma-joined editing form.
    pub fn set_terms_joined(&mut self, joined: &str) {
        self.video_terms = VideoTerms::parse(joined);
    }

    /// Switch the background-music source.  Leaving `Custom` forgets the
    /// custom file.
    pub fn set_bgm_type(&mut self, bgm_type: BgmType) {
        self.bgm_type = bgm_type;
        if bgm_type != BgmType::Custom {
            self.bgm_file = None;
        }
    }

    /// Select a custom background-music file.
    ///
    /// The file must exist right now; otherwise nothing changes and
    /// [`ParamsError::BgmNotFound`] is returned.
    pub fn select_custom_bgm(&mut self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ParamsError::BgmNotFound(path.to_path_buf()));
        }
        self.bgm_type = BgmType::Custom;
        self.bgm_file = Some(path.to_path_buf());
        Ok(())
    }

    /// The submission invariant: subject and script may not both be empty.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.video_subject.trim().is_empty() && self.video_script.trim().is_empty() {
            return Err(ParamsError::EmptySubjectAndScript);
        }
        Ok(())
    }

    /// Check every bounded field.  Returns the first violation found.
    pub fn check_ranges(&self) -> Result<(), ParamsError> {
        check_u32(
            "video_clip_duration",
            self.video_clip_duration,
            CLIP_DURATION_RANGE,
        )?;
        check_u32("video_count", self.video_count, VIDEO_COUNT_RANGE)?;
        check_u32("font_size", self.font_size, FONT_SIZE_RANGE)?;
        check_f32("stroke_width", self.stroke_width, STROKE_WIDTH_RANGE)?;
        check_f32("bgm_volume", self.bgm_volume, BGM_VOLUME_RANGE)?;

        let tenths = self.bgm_volume * 10.0;
        if (tenths - tenths.round()).abs() > 1e-3 {
            return Err(ParamsError::VolumeStep(self.bgm_volume));
        }

        if !self.video_aspect.is_supported() {
            return Err(ParamsError::UnsupportedAspect(self.video_aspect.ratio()));
        }

        if voice::find_voice(&self.voice_name).is_none() {
            return Err(ParamsError::UnknownVoice(self.voice_name.clone()));
        }

        if self.bgm_type == BgmType::Custom && self.bgm_file.is_none() {
            return Err(ParamsError::MissingBgmFile);
        }

        Ok(())
    }

    /// Check that `font_name` is among `available` fonts.  Skipped while
    /// subtitles are disabled.
    pub fn check_font(&self, available: &[String]) -> Result<(), ParamsError> {
        if !self.subtitle_enabled || available.iter().any(|f| f == &self.font_name) {
            return Ok(());
        }
        Err(ParamsError::UnknownFont(self.font_name.clone()))
    }

    /// Load a task file.  Missing fields take their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut params: Self = toml::from_str(&content)?;
        params.video_subject = params.video_subject.trim().to_string();
        Ok(params)
    }

    /// Save as a task file, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn check_u32(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), ParamsError> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ParamsError::OutOfRange {
        field,
        value: f64::from(value),
        min: f64::from(min),
        max: f64::from(max),
    })
}

fn check_f32(field: &'static str, value: f32, (min, max): (f32, f32)) -> Result<(), ParamsError> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ParamsError::OutOfRange {
        field,
        value: f64::from(value),
        min: f64::from(min),
        max: f64::from(max),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_stable() {
        let p = VideoParams::default();

        assert_eq!(p.video_concat_mode, VideoConcatMode::Random);
        assert_eq!(p.video_aspect, VideoAspect::Portrait);
        assert!((p.bgm_volume - 0.2).abs() < f32::EPSILON);
        assert!(p.subtitle_enabled);

        assert_eq!(p.video_language, VideoLanguage::Auto);
        assert_eq!(p.video_clip_duration, 3);
        assert_eq!(p.video_count, 1);
        assert_eq!(p.bgm_type, BgmType::Random);
        assert!(p.bgm_file.is_none());
        assert_eq!(p.subtitle_position, SubtitlePosition::Bottom);
        assert_eq!(p.text_fore_color, HexColor::WHITE);
        assert_eq!(p.font_size, 60);
        assert_eq!(p.stroke_color, HexColor::BLACK);
        assert!((p.stroke_width - 1.5).abs() < f32::EPSILON);
        assert!(p.video_subject.is_empty());
        assert!(p.video_script.is_empty());
        assert!(p.video_terms.is_empty());
    }

    #[test]
    fn defaults_pass_range_checks() {
        assert_eq!(VideoParams::default().check_ranges(), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_subject_and_script() {
        let mut p = VideoParams::default();
        assert_eq!(p.validate(), Err(ParamsError::EmptySubjectAndScript));

        p.video_subject = "   ".into();
        p.video_script = "\n".into();
        assert_eq!(p.validate(), Err(ParamsError::EmptySubjectAndScript));
    }

    #[test]
    fn validate_accepts_subject_or_script() {
        let mut p = VideoParams::default();
        p.set_subject("history of coffee");
        assert!(p.validate().is_ok());

        let mut p = VideoParams::default();
        p.video_script = "Coffee began in Ethiopia.".into();
        assert!(p.validate().is_ok());
    }

    #[test]
    fn set_subject_trims() {
        let mut p = VideoParams::default();
        p.set_subject("  the ocean \n");
        assert_eq!(p.video_subject, "the ocean");
    }

    #[test]
    fn clip_duration_out_of_range() {
        let mut p = VideoParams::default();
        p.video_clip_duration = 7;
        assert!(matches!(
            p.check_ranges(),
            Err(ParamsError::OutOfRange {
                field: "video_clip_duration",
                ..
            })
        ));
    }

    #[test]
    fn video_count_and_font_size_bounds() {
        let mut p = VideoParams::default();
        p.video_count = 0;
        assert!(p.check_ranges().is_err());

        let mut p = VideoParams::default();
        p.font_size = 101;
        assert!(p.check_ranges().is_err());

        let mut p = VideoParams::default();
        p.video_count = 5;
        p.font_size = 30;
        assert!(p.check_ranges().is_ok());
    }

    #[test]
    fn bgm_volume_must_be_tenths() {
        let mut p = VideoParams::default();
        p.bgm_volume = 0.25;
        assert_eq!(p.check_ranges(), Err(ParamsError::VolumeStep(0.25)));

        p.bgm_volume = 0.7;
        assert!(p.check_ranges().is_ok());

        p.bgm_volume = 1.1;
        assert!(matches!(
            p.check_ranges(),
            Err(ParamsError::OutOfRange {
                field: "bgm_volume",
                ..
            })
        ));
    }

    #[test]
    fn square_aspect_is_reserved() {
        let mut p = VideoParams::default();
        p.video_aspect = VideoAspect::Square;
        assert_eq!(p.check_ranges(), Err(ParamsError::UnsupportedAspect("1:1")));
    }

    #[test]
    fn unknown_voice_rejected() {
        let mut p = VideoParams::default();
        p.voice_name = "xx-XX-NobodyNeural-Male".into();
        assert!(matches!(p.check_ranges(), Err(ParamsError::UnknownVoice(_))));
    }

    #[test]
    fn custom_bgm_requires_existing_file() {
        let dir = tempdir().expect("temp dir");
        let song = dir.path().join("calm.mp3");
        std::fs::write(&song, b"id3").unwrap();

        let mut p = VideoParams::default();
        let missing = dir.path().join("missing.mp3");
        assert!(matches!(
            p.select_custom_bgm(&missing),
            Err(ParamsError::BgmNotFound(_))
        ));
        assert_eq!(p.bgm_type, BgmType::Random);
        assert!(p.bgm_file.is_none());

        p.select_custom_bgm(&song).unwrap();
        assert_eq!(p.bgm_type, BgmType::Custom);
        assert_eq!(p.bgm_file.as_deref(), Some(song.as_path()));

        p.set_bgm_type(BgmType::None);
        assert!(p.bgm_file.is_none());
    }

    #[test]
    fn custom_bgm_without_file_fails_range_check() {
        let mut p = VideoParams::default();
        p.bgm_type = BgmType::Custom;
        assert_eq!(p.check_ranges(), Err(ParamsError::MissingBgmFile));
    }

    #[test]
    fn font_check_respects_subtitle_toggle() {
        let fonts = vec!["STHeitiMedium.ttc".to_string()];
        let mut p = VideoParams::default();
        p.font_name = "Missing.ttf".into();
        assert!(matches!(p.check_font(&fonts), Err(ParamsError::UnknownFont(_))));

        p.subtitle_enabled = false;
        assert!(p.check_font(&fonts).is_ok());

        p.subtitle_enabled = true;
        p.font_name = "STHeitiMedium.ttc".into();
        assert!(p.check_font(&fonts).is_ok());
    }

    #[test]
    fn language_codes_round_trip() {
        for lang in VideoLanguage::ALL {
            assert_eq!(VideoLanguage::from_code(lang.code()), Some(lang));
        }
        assert_eq!(VideoLanguage::from_code("fr-FR"), None);
    }

    #[test]
    fn task_file_round_trip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("task.toml");

        let mut p = VideoParams::default();
        p.set_subject("history of coffee");
        p.video_language = VideoLanguage::EnUs;
        p.set_terms_joined("coffee, ethiopia, beans");
        p.video_aspect = VideoAspect::Landscape;
        p.video_concat_mode = VideoConcatMode::Sequential;
        p.set_bgm_type(BgmType::None);
        p.text_fore_color = HexColor::rgb(0xFF, 0xCC, 0x00);

        p.save_to(&path).expect("save");
        let loaded = VideoParams::load_from(&path).expect("load");

        assert_eq!(loaded, p);
    }

    #[test]
    fn task_file_uses_wire_values_and_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            r##"
video_subject = "  night sky  "
video_language = "zh-TW"
video_aspect = "16:9"
bgm_type = ""
video_terms = "stars, galaxy"
text_fore_color = "#ff0000"
"##,
        )
        .unwrap();

        let p = VideoParams::load_from(&path).expect("load");
        assert_eq!(p.video_subject, "night sky");
        assert_eq!(p.video_language, VideoLanguage::ZhTw);
        assert_eq!(p.video_aspect, VideoAspect::Landscape);
        assert_eq!(p.bgm_type, BgmType::None);
        assert_eq!(p.video_terms.joined(), "stars, galaxy");
        assert_eq!(p.text_fore_color, HexColor::rgb(255, 0, 0));
        assert_eq!(p.video_count, 1);
    }
}
