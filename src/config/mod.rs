//! Configuration module for the video studio.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the LLM
//! backend, generation, asset discovery and task execution, `AppPaths` for
//! cross-platform directories, and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AssetConfig, GenerationConfig, LlmConfig, LlmProvider, TaskConfig};
