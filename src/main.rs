use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use slide_label_ocr::cli::Args;
use slide_label_ocr::config::Config;
use slide_label_ocr::engine::OcrEngine;
use slide_label_ocr::error::OcrError;
use slide_label_ocr::{batch, engines, extract_label, output, LabelText};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code when the batch root does not exist
const EXIT_MISSING_ROOT: u8 = 2;

/// JSON report for `--json`
#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    label: LabelText,
    engine: &'static str,
    processing_time_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the OCR text
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from(args);

    tracing::debug!("slide-label-ocr v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("OCR settings: {:?}", config.ocr);

    match config.batch_root.clone() {
        Some(root) => run_batch(config, &root).await,
        None => run_single(config).await,
    }
}

async fn run_single(config: Config) -> anyhow::Result<ExitCode> {
    let input = config
        .input
        .clone()
        .context("An input image or --batch is required")?;
    let engine = engines::create(&config)?;

    let start = Instant::now();
    let ocr = config.ocr.clone();
    let task_engine = Arc::clone(&engine);
    let task_input = input.clone();
    let label = tokio::task::spawn_blocking(move || -> Result<LabelText, OcrError> {
        let image = image::open(&task_input).map_err(|e| {
            OcrError::ProcessingError(format!("Failed to open {}: {}", task_input.display(), e))
        })?;
        extract_label(&image, &ocr, task_engine.as_ref())
    })
    .await
    .context("OCR task panicked")?
    .with_context(|| format!("OCR failed for {}", input.display()))?;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "OCR completed in {}ms, confidence: {:.2}, text length: {}",
        processing_time_ms,
        label.confidence,
        label.text.len()
    );

    let payload = if config.json {
        let report = Report {
            label,
            engine: engine.name(),
            processing_time_ms,
        };
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        json
    } else {
        label.text
    };

    match &config.output {
        Some(path) => {
            output::write_text_atomic(path, &payload)?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", payload),
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_batch(config: Config, root: &Path) -> anyhow::Result<ExitCode> {
    if !root.is_dir() {
        tracing::error!("Batch root not found: {}", root.display());
        return Ok(ExitCode::from(EXIT_MISSING_ROOT));
    }

    let plan = batch::plan(root)?;
    tracing::info!(
        "{} images to process, {} up to date, {} conflicting",
        plan.jobs.len(),
        plan.up_to_date,
        plan.conflicts.len()
    );

    if config.dry_run {
        for job in &plan.jobs {
            println!("{}", batch::dry_run_line(job, &config.ocr));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let engine: Arc<dyn OcrEngine> = engines::create(&config)?;
    let summary = batch::run(plan, Arc::new(config.ocr), engine, config.jobs).await;

    tracing::info!(
        "Batch finished: {} processed, {} skipped, {} failed",
        summary.processed,
        summary.skipped,
        summary.failed
    );

    if summary.failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
