//! Short-video task studio.
//!
//! Collects the parameters of one video-generation task, drafts the
//! narration script and stock-footage search terms with an LLM, and hands the
//! finished parameters to a task runner whose progress is streamed back as
//! log lines.
//!
//! * [`params`]   — [`VideoParams`](params::VideoParams), the per-task configuration.
//! * [`llm`]      — generation backend trait and the OpenAI-compatible client.
//! * [`pipeline`] — the two-stage script → terms generation over a [`Draft`](pipeline::Draft).
//! * [`task`]     — submission, task ids and the per-task log channel.
//! * [`assets`]   — font and background-music discovery.
//! * [`config`]   — application settings and paths.

pub mod assets;
pub mod config;
pub mod llm;
pub mod params;
pub mod pipeline;
pub mod task;
