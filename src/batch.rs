//! Batch mode: OCR every label image under a directory tree

use crate::config::OcrConfig;
use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::extract::extract_text;
use crate::output::{is_up_to_date, output_path_for, write_text_atomic};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// File extensions treated as label images (lowercase)
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// One image and the text file it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub image: PathBuf,
    pub output: PathBuf,
}

/// Work left after discovery
#[derive(Debug, Default)]
pub struct BatchPlan {
    pub jobs: Vec<BatchJob>,
    /// Images whose output is already newer than the image
    pub up_to_date: usize,
    /// Images whose output path is already claimed by an earlier image
    /// (e.g. `a.png` next to `a.jpg`); never processed, counted as failed
    pub conflicts: Vec<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Recursively list image files below `root`, sorted by path
pub fn discover_images(root: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| {
            OcrError::ProcessingError(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if path.is_dir() {
                pending.push(path);
            } else if is_image(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Discover images and drop those with an up-to-date output
///
/// When several images map to the same output file, the first in path order
/// keeps it and the others are reported as conflicts.
pub fn plan(root: &Path) -> Result<BatchPlan, OcrError> {
    let mut plan = BatchPlan::default();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for image in discover_images(root)? {
        let output = output_path_for(&image);
        if let Some(owner) = claimed.get(&output) {
            tracing::warn!(
                "Skipping {}: {} already belongs to {}",
                image.display(),
                output.display(),
                owner.display()
            );
            plan.conflicts.push(image);
            continue;
        }
        claimed.insert(output.clone(), image.clone());

        if is_up_to_date(&image, &output) {
            tracing::debug!("Up to date: {}", output.display());
            plan.up_to_date += 1;
        } else {
            plan.jobs.push(BatchJob { image, output });
        }
    }

    Ok(plan)
}

/// Run every job on the blocking pool, at most `parallelism` at a time
///
/// Failures are logged and counted; they never stop the remaining jobs.
pub async fn run(
    plan: BatchPlan,
    config: Arc<OcrConfig>,
    engine: Arc<dyn OcrEngine>,
    parallelism: usize,
) -> BatchSummary {
    let summary = BatchSummary {
        skipped: plan.up_to_date,
        failed: plan.conflicts.len(),
        ..BatchSummary::default()
    };

    stream::iter(plan.jobs)
        .map(|job| {
            let config = Arc::clone(&config);
            let engine = Arc::clone(&engine);
            async move {
                let task_job = job.clone();
                let result = tokio::task::spawn_blocking(move || {
                    process_job(&task_job, &config, engine.as_ref())
                })
                .await
                .map_err(|e| OcrError::ProcessingError(format!("OCR task failed: {}", e)))
                .and_then(|r| r);
                (job, result)
            }
        })
        .buffer_unordered(parallelism.max(1))
        .fold(summary, |mut summary, (job, result)| async move {
            match result {
                Ok(elapsed_ms) => {
                    tracing::info!(
                        "OK  {} -> {} ({}ms)",
                        job.image.display(),
                        job.output.display(),
                        elapsed_ms
                    );
                    summary.processed += 1;
                }
                Err(e) => {
                    tracing::error!("FAIL {}: {} [{}]", job.image.display(), e, e.code());
                    summary.failed += 1;
                }
            }
            summary
        })
        .await
}

/// One `--dry-run` line: image, output and the search lists
pub fn dry_run_line(job: &BatchJob, config: &OcrConfig) -> String {
    let psms: Vec<String> = config.psm_candidates.iter().map(|p| p.to_string()).collect();
    format!(
        "{} -> {} (langs={} psms={})",
        job.image.display(),
        job.output.display(),
        config.language_candidates.join(","),
        psms.join(",")
    )
}

/// Decode, extract and write one image; returns the elapsed milliseconds
fn process_job(job: &BatchJob, config: &OcrConfig, engine: &dyn OcrEngine) -> Result<u64, OcrError> {
    let start = Instant::now();
    let image = image::open(&job.image).map_err(|e| {
        OcrError::ProcessingError(format!("Failed to open {}: {}", job.image.display(), e))
    })?;
    let text = extract_text(&image, config, engine)?;
    write_text_atomic(&job.output, &text)?;
    Ok(start.elapsed().as_millis() as u64)
}
