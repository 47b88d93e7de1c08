//! LLM generation backend.
//!
//! This module provides:
//! * [`ScriptGenerator`] — async trait for the script and terms stages.
//! * [`ApiGenerator`] — OpenAI-compatible REST implementation.
//! * [`PromptBuilder`] — builds the script / terms chat prompts.
//! * [`clean_script`] / [`parse_terms`] — post-processing of raw replies.
//! * [`LlmError`] — error variants for backend calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use video_studio::config::AppConfig;
//! use video_studio::llm::{ApiGenerator, ScriptGenerator};
//! use video_studio::params::VideoLanguage;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = ApiGenerator::from_config(&config.llm, &config.generation);
//!
//!     let script = generator
//!         .generate_script("history of coffee", VideoLanguage::Auto)
//!         .await
//!         .unwrap();
//!     let terms = generator
//!         .generate_terms("history of coffee", &script)
//!         .await
//!         .unwrap();
//!     println!("{script}\n\n{terms}");
//! }
//! ```

pub mod generator;
pub mod prompt;
pub mod response;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use generator::{ApiGenerator, LlmError, ScriptGenerator};
pub use prompt::PromptBuilder;
pub use response::{clean_script, parse_terms};

// test-only re-export so the pipeline and task tests can share one double.
#[cfg(test)]
pub use generator::MockGenerator;
