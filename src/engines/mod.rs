//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. The statically linked engine is compiled only with the
//! `engine-tesseract` feature.

pub mod cli;
pub mod tsv;

#[cfg(feature = "engine-tesseract")]
pub mod tesseract;

use crate::cli::EngineKind;
use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::OcrError;
use std::sync::Arc;

/// Build the engine selected in the configuration
pub fn create(config: &Config) -> Result<Arc<dyn OcrEngine>, OcrError> {
    match config.engine {
        EngineKind::TesseractCli => {
            tracing::info!("Initializing tesseract-cli engine...");
            Ok(Arc::new(cli::TesseractCliEngine::new(config)))
        }
        EngineKind::Tesseract => create_static(config),
    }
}

#[cfg(feature = "engine-tesseract")]
fn create_static(config: &Config) -> Result<Arc<dyn OcrEngine>, OcrError> {
    tracing::info!("Initializing tesseract engine...");
    Ok(Arc::new(tesseract::TesseractEngine::new(config)?))
}

#[cfg(not(feature = "engine-tesseract"))]
fn create_static(_config: &Config) -> Result<Arc<dyn OcrEngine>, OcrError> {
    Err(OcrError::InitializationError(
        "The tesseract engine is not compiled in. Build with --features engine-tesseract or use --engine tesseract-cli".to_string(),
    ))
}
