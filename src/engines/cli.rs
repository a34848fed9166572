//! Tesseract command-line engine
//!
//! Drives the system `tesseract` executable. Each call writes the candidate
//! image to a temporary PNG and reads the result from stdout, so no native
//! libraries are linked into this binary.

use super::tsv;
use crate::config::Config;
use crate::engine::{OcrEngine, RecognitionParams, Token};
use crate::error::OcrError;
use image::GrayImage;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

/// Tesseract invoked as a subprocess
pub struct TesseractCliEngine {
    /// Executable name or path
    program: PathBuf,
    /// Optional `--tessdata-dir`
    tessdata_path: Option<PathBuf>,
}

impl TesseractCliEngine {
    pub fn new(config: &Config) -> Self {
        tracing::info!(
            "Tesseract CLI engine configured (program: {}, tessdata: {})",
            config.tesseract_path.display(),
            config
                .tessdata_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "default".to_string())
        );

        Self {
            program: config.tesseract_path.clone(),
            tessdata_path: config.tessdata_path.clone(),
        }
    }

    /// Run tesseract on the image; `extra` is appended after the options
    /// (e.g. the `tsv` config name)
    fn run(
        &self,
        image: &GrayImage,
        params: &RecognitionParams<'_>,
        extra: &[&str],
    ) -> Result<String, OcrError> {
        let input = tempfile::Builder::new()
            .prefix("slide-label-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to create temp file: {}", e)))?;

        image
            .save_with_format(input.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write PNG: {}", e)))?;

        let mut command = Command::new(&self.program);
        command
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(params.language)
            .arg("--oem")
            .arg(params.engine_mode.to_string())
            .arg("--psm")
            .arg(params.psm.to_string());
        if let Some(dir) = &self.tessdata_path {
            command.arg("--tessdata-dir").arg(dir);
        }
        command.args(extra);

        tracing::trace!(
            "Running {:?} ({}x{})",
            command,
            image.width(),
            image.height()
        );

        let output = command.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => OcrError::EngineUnavailable(format!(
                "'{}' not found; install Tesseract or pass --tesseract-path",
                self.program.display()
            )),
            _ => OcrError::EngineUnavailable(format!(
                "Failed to start '{}': {}",
                self.program.display(),
                e
            )),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::EngineFailure(format!(
                "tesseract exited with {} (lang: {}, psm: {}): {}",
                output.status,
                params.language,
                params.psm,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractCliEngine {
    fn name(&self) -> &'static str {
        "tesseract-cli"
    }

    fn recognize_words(
        &self,
        image: &GrayImage,
        params: &RecognitionParams<'_>,
    ) -> Result<Vec<Token>, OcrError> {
        let tsv = self.run(image, params, &["tsv"])?;
        Ok(tsv::parse_words(&tsv))
    }

    fn recognize_text(
        &self,
        image: &GrayImage,
        params: &RecognitionParams<'_>,
    ) -> Result<String, OcrError> {
        self.run(image, params, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OcrConfig;
    use crate::cli::EngineKind;

    fn engine_with_program(program: &str) -> TesseractCliEngine {
        let config = Config {
            ocr: OcrConfig::default(),
            engine: EngineKind::TesseractCli,
            tesseract_path: PathBuf::from(program),
            tessdata_path: None,
            input: None,
            output: None,
            batch_root: None,
            jobs: 1,
            dry_run: false,
            json: false,
        };
        TesseractCliEngine::new(&config)
    }

    #[test]
    fn test_missing_executable_is_engine_unavailable() {
        let engine = engine_with_program("/nonexistent/bin/tesseract-missing");
        let image = GrayImage::from_pixel(8, 8, image::Luma([255]));
        let params = RecognitionParams {
            language: "eng",
            psm: 6,
            engine_mode: 3,
        };

        let err = engine.recognize_words(&image, &params).unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable(_)), "{:?}", err);
    }

    #[test]
    fn test_engine_name() {
        assert_eq!(engine_with_program("tesseract").name(), "tesseract-cli");
    }
}
