//! Generation pipeline: script first, then search terms derived from it.
//!
//! # Architecture
//!
//! ```text
//! Draft (owned by the caller, passed by &mut)
//!    │
//!    ├─ GenerationPipeline::generate_script   ─▶ ScriptGenerator::generate_script
//!    ├─ GenerationPipeline::generate_terms    ─▶ ScriptGenerator::generate_terms
//!    └─ GenerationPipeline::generate_script_and_terms
//!
//! every backend call: tokio::time::timeout + CancellationToken
//! ```
//!
//! The two stages are independent: terms can be regenerated against a
//! hand-edited script, and a script can be regenerated without discarding
//! hand-curated terms.

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{GenerationPipeline, PipelineError};
pub use state::{Draft, DraftStage};
