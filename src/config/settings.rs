//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// LlmProvider
// ---------------------------------------------------------------------------

/// Selects which LLM service drafts scripts and search terms.
///
/// Every provider speaks the OpenAI chat-completions wire format; they differ
/// only in their default endpoint and whether an API key is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// api.openai.com
    OpenAi,
    /// Moonshot (Kimi), OpenAI-compatible.
    Moonshot,
    /// Ollama running locally in OpenAI mode; no authentication required.
    Ollama,
    /// Any other OpenAI-compatible endpoint (LM Studio, vLLM, one-api …).
    OpenAiCompatible,
}

impl LlmProvider {
    /// Endpoint used when `LlmConfig::base_url` is left empty.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com",
            LlmProvider::Moonshot => "https://api.moonshot.cn",
            LlmProvider::Ollama => "http://localhost:11434",
            LlmProvider::OpenAiCompatible => "http://localhost:8000",
        }
    }

    /// Whether the provider refuses requests without a bearer token.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, LlmProvider::OpenAi | LlmProvider::Moonshot)
    }
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::OpenAi
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Connection settings for the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which service to talk to.
    pub provider: LlmProvider,
    /// Base URL of the API endpoint.  Empty means the provider default.
    pub base_url: String,
    /// API key; `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// HTTP-level timeout for a single request.
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// `base_url` with the provider default substituted and any trailing
    /// slash removed.
    pub fn endpoint(&self) -> String {
        let base = if self.base_url.trim().is_empty() {
            self.provider.default_base_url()
        } else {
            self.base_url.trim()
        };
        base.trim_end_matches('/').to_string()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: String::new(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Knobs for the script → terms generation stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Number of paragraphs requested for a generated script.
    pub paragraph_number: u32,
    /// Number of search terms requested from the backend.
    pub term_amount: usize,
    /// Upper bound for one generation stage, including the HTTP round trip.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            paragraph_number: 1,
            term_amount: 5,
            timeout_secs: 90,
        }
    }
}

// ---------------------------------------------------------------------------
// AssetConfig
// ---------------------------------------------------------------------------

/// Where subtitle fonts and background-music tracks are discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub font_dir: PathBuf,
    pub song_dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        let paths = AppPaths::new();
        Self {
            font_dir: paths.font_dir,
            song_dir: paths.song_dir,
        }
    }
}

// ---------------------------------------------------------------------------
// TaskConfig
// ---------------------------------------------------------------------------

/// Settings for task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Pause between stages of the dry-run runner, in milliseconds.
    pub dry_run_step_delay_ms: u64,
    /// Directory prefix redacted to `.` in task log lines.  `None` disables
    /// redaction.
    pub redact_root: Option<PathBuf>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            dry_run_step_delay_ms: 200,
            redact_root: std::env::current_dir().ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use video_studio::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// # let _ = config;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation backend connection.
    pub llm: LlmConfig,
    /// Script / terms generation settings.
    pub generation: GenerationConfig,
    /// Font and music discovery directories.
    pub assets: AssetConfig,
    /// Task execution settings.
    pub task: TaskConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.llm.provider, loaded.llm.provider);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.api_key, loaded.llm.api_key);
        assert_eq!(original.llm.timeout_secs, loaded.llm.timeout_secs);
        assert_eq!(
            original.generation.paragraph_number,
            loaded.generation.paragraph_number
        );
        assert_eq!(original.generation.term_amount, loaded.generation.term_amount);
        assert_eq!(original.assets.font_dir, loaded.assets.font_dir);
        assert_eq!(original.assets.song_dir, loaded.assets.song_dir);
        assert_eq!(
            original.task.dry_run_step_delay_ms,
            loaded.task.dry_run_step_delay_ms
        );
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.llm.model, default.llm.model);
        assert_eq!(config.generation.term_amount, default.generation.term_amount);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.llm.provider, LlmProvider::OpenAi);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert!(cfg.llm.api_key.is_none());
        assert_eq!(cfg.generation.paragraph_number, 1);
        assert_eq!(cfg.generation.term_amount, 5);
        assert!(cfg.assets.font_dir.ends_with("fonts"));
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.llm.provider = LlmProvider::Ollama;
        cfg.llm.api_key = Some("sk-test".into());
        cfg.llm.model = "qwen2.5:7b".into();
        cfg.generation.term_amount = 8;
        cfg.assets.song_dir = PathBuf::from("/srv/songs");
        cfg.task.redact_root = None;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.llm.provider, LlmProvider::Ollama);
        assert_eq!(loaded.llm.api_key, Some("sk-test".into()));
        assert_eq!(loaded.llm.model, "qwen2.5:7b");
        assert_eq!(loaded.generation.term_amount, 8);
        assert_eq!(loaded.assets.song_dir, PathBuf::from("/srv/songs"));
        assert!(loaded.task.redact_root.is_none());
    }

    #[test]
    fn endpoint_falls_back_to_provider_default() {
        let mut cfg = LlmConfig::default();
        assert_eq!(cfg.endpoint(), "https://api.openai.com");

        cfg.provider = LlmProvider::Ollama;
        assert_eq!(cfg.endpoint(), "http://localhost:11434");

        cfg.base_url = "https://llm.internal/".into();
        assert_eq!(cfg.endpoint(), "https://llm.internal");
    }

    #[test]
    fn only_hosted_providers_require_keys() {
        assert!(LlmProvider::OpenAi.requires_api_key());
        assert!(LlmProvider::Moonshot.requires_api_key());
        assert!(!LlmProvider::Ollama.requires_api_key());
        assert!(!LlmProvider::OpenAiCompatible.requires_api_key());
    }
}
