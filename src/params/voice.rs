//! Catalog of synthesized narration voices.
//!
//! The media pipeline resolves [`VideoParams::voice_name`] against this list;
//! names follow the `<locale>-<Voice>Neural-<Gender>` convention of the TTS
//! service.
//!
//! [`VideoParams::voice_name`]: crate::params::VideoParams::voice_name

// ---------------------------------------------------------------------------
// VoiceGender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceGender {
    Female,
    Male,
}

impl VoiceGender {
    pub fn label(&self) -> &'static str {
        match self {
            VoiceGender::Female => "Female",
            VoiceGender::Male => "Male",
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceInfo
// ---------------------------------------------------------------------------

/// Static metadata for one catalog voice.
#[derive(Debug)]
pub struct VoiceInfo {
    /// Identifier stored in `VideoParams::voice_name`.
    pub name: &'static str,
    /// BCP-47 locale the voice speaks.
    pub locale: &'static str,
    pub gender: VoiceGender,
}

macro_rules! voice {
    ($name:literal, $locale:literal, $gender:ident) => {
        VoiceInfo {
            name: $name,
            locale: $locale,
            gender: VoiceGender::$gender,
        }
    };
}

/// Every voice the narration stage can synthesize.  The first entry is the
/// default for new tasks.
pub const VOICES: &[VoiceInfo] = &[
    voice!("zh-CN-XiaoxiaoNeural-Female", "zh-CN", Female),
    voice!("zh-CN-XiaoyiNeural-Female", "zh-CN", Female),
    voice!("zh-CN-YunjianNeural-Male", "zh-CN", Male),
    voice!("zh-CN-YunxiNeural-Male", "zh-CN", Male),
    voice!("zh-CN-YunxiaNeural-Male", "zh-CN", Male),
    voice!("zh-CN-YunyangNeural-Male", "zh-CN", Male),
    voice!("zh-CN-liaoning-XiaobeiNeural-Female", "zh-CN", Female),
    voice!("zh-CN-shaanxi-XiaoniNeural-Female", "zh-CN", Female),
    voice!("zh-HK-HiuGaaiNeural-Female", "zh-HK", Female),
    voice!("zh-HK-HiuMaanNeural-Female", "zh-HK", Female),
    voice!("zh-HK-WanLungNeural-Male", "zh-HK", Male),
    voice!("zh-TW-HsiaoChenNeural-Female", "zh-TW", Female),
    voice!("zh-TW-HsiaoYuNeural-Female", "zh-TW", Female),
    voice!("zh-TW-YunJheNeural-Male", "zh-TW", Male),
    voice!("en-US-AnaNeural-Female", "en-US", Female),
    voice!("en-US-AndrewNeural-Male", "en-US", Male),
    voice!("en-US-AriaNeural-Female", "en-US", Female),
    voice!("en-US-AvaNeural-Female", "en-US", Female),
    voice!("en-US-BrianNeural-Male", "en-US", Male),
    voice!("en-US-ChristopherNeural-Male", "en-US", Male),
    voice!("en-US-EmmaNeural-Female", "en-US", Female),
    voice!("en-US-EricNeural-Male", "en-US", Male),
    voice!("en-US-GuyNeural-Male", "en-US", Male),
    voice!("en-US-JennyNeural-Female", "en-US", Female),
    voice!("en-US-MichelleNeural-Female", "en-US", Female),
    voice!("en-US-RogerNeural-Male", "en-US", Male),
    voice!("en-US-SteffanNeural-Male", "en-US", Male),
];

/// Name of the voice new tasks start with.
pub fn default_voice() -> &'static str {
    VOICES[0].name
}

/// Look up a catalog voice by its exact name.
pub fn find_voice(name: &str) -> Option<&'static VoiceInfo> {
    VOICES.iter().find(|v| v.name == name)
}

/// All voices for a locale such as `"en-US"`.
pub fn voices_for_locale(locale: &str) -> Vec<&'static VoiceInfo> {
    VOICES.iter().filter(|v| v.locale == locale).collect()
}

/// Human-readable label for a voice name, e.g.
/// `"en-US-JennyNeural-Female"` → `"English (US) Jenny Female"`.
///
/// Unknown names are returned with only the `Neural` marker stripped.
pub fn friendly_name(name: &str) -> String {
    let Some(info) = find_voice(name) else {
        return name.replace("Neural", "");
    };

    let region = match info.locale {
        "zh-CN" => "Chinese (Mainland)",
        "zh-HK" => "Chinese (Hong Kong)",
        "zh-TW" => "Chinese (Taiwan)",
        "en-US" => "English (US)",
        other => other,
    };

    // Strip the locale prefix and the gender suffix, keep any dialect tag.
    let stem = name
        .strip_prefix(info.locale)
        .unwrap_or(name)
        .trim_start_matches('-');
    let stem = stem
        .rsplit_once('-')
        .map(|(head, _gender)| head)
        .unwrap_or(stem)
        .replace("Neural", "");

    format!("{region} {stem} {}", info.gender.label())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
