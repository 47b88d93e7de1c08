//! Command-line entry point.
//!
//! ```text
//! video-studio <task.toml>
//! ```
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults on first run).
//! 3. Create the [`tokio`] runtime.
//! 4. Load the task file and check it.
//! 5. Draft the script and search terms when the task file leaves them empty.
//! 6. Submit to the dry-run runner and print its log lines until it finishes.
//!
//! Ctrl-C during generation cancels the in-flight backend call.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use video_studio::{
    assets,
    config::AppConfig,
    llm::{ApiGenerator, ScriptGenerator},
    params::VideoParams,
    pipeline::{Draft, DraftStage, GenerationPipeline},
    task::{DryRunRunner, TaskSubmitter},
};

// ---------------------------------------------------------------------------
// Task preparation
// ---------------------------------------------------------------------------

/// Load the task file and apply the checks that need the environment.
fn load_task(path: &Path, config: &AppConfig) -> Result<VideoParams> {
    let mut params = VideoParams::load_from(path)
        .with_context(|| format!("reading task file {}", path.display()))?;

    params.validate()?;
    params.check_ranges()?;

    if params.subtitle_enabled {
        let fonts = assets::list_fonts(&config.assets.font_dir);
        if fonts.is_empty() {
            log::warn!(
                "no fonts found in {}, skipping font check",
                config.assets.font_dir.display()
            );
        } else {
            if params.font_name.is_empty() {
                params.font_name = fonts[0].clone();
                log::info!("no font selected, using {}", params.font_name);
            }
            params.check_font(&fonts)?;
        }
    }

    Ok(params)
}

/// Fill in whatever the task file left empty.
async fn complete_draft(
    draft: &mut Draft,
    pipeline: &GenerationPipeline,
    cancel: &CancellationToken,
) -> Result<()> {
    match draft.stage() {
        DraftStage::NoScript => {
            log::info!("generating script and search terms");
            pipeline.generate_script_and_terms(draft, cancel).await?;
        }
        DraftStage::HasScript => {
            log::info!("generating search terms from the given script");
            pipeline.generate_terms(draft, cancel).await?;
        }
        DraftStage::HasTerms => {
            log::info!("script and search terms given, skipping generation");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn run(config: AppConfig, task_path: PathBuf) -> Result<()> {
    let params = load_task(&task_path, &config)?;
    let mut draft = Draft::new(params);

    let generator: Arc<dyn ScriptGenerator> =
        Arc::new(ApiGenerator::from_config(&config.llm, &config.generation));
    let pipeline = GenerationPipeline::from_config(generator, &config.generation);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupted, cancelling");
                cancel.cancel();
            }
        });
    }

    complete_draft(&mut draft, &pipeline, &cancel).await?;

    let params = draft.into_params();
    println!("script:\n{}\n", params.video_script);
    println!("search terms: {}\n", params.video_terms);

    let runner = Arc::new(DryRunRunner::from_config(&config.task, &config.assets));
    let submitter = TaskSubmitter::from_config(runner, &config.task);
    let mut handle = submitter.submit(params)?;
    log::info!("task id: {}", handle.task_id());

    if let Some(mut logs) = handle.take_logs() {
        while let Some(line) = logs.recv().await {
            println!("{line}");
        }
    }

    handle.wait().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(task_path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: video-studio <task.toml>");
        return ExitCode::from(2);
    };

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    // 4-6.
    match rt.block_on(run(config, task_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
