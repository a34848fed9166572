//! Statically linked Tesseract engine
//!
//! Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) automatically on first use, one
//! traineddata file per component of a combined tag such as "jpn+eng".

use super::tsv;
use crate::config::Config;
use crate::engine::{OcrEngine, RecognitionParams, Token};
use crate::error::OcrError;
use image::GrayImage;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tesseract_static::tesseract::Tesseract;

/// Tesseract OCR Engine
pub struct TesseractEngine {
    /// Path to tessdata directory
    tessdata_path: String,
}

impl TesseractEngine {
    /// Create the engine, fetching tessdata for every configured language
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let tessdata_path = match &config.tessdata_path {
            Some(dir) => dir
                .to_str()
                .map(|s| s.to_string())
                .ok_or_else(|| OcrError::InitializationError("Invalid tessdata path".to_string()))?,
            None => ensure_tessdata_available(&config.ocr.language_candidates)?,
        };

        if config.ocr.engine_mode != 3 {
            tracing::warn!(
                "Engine mode {} ignored by the static engine (uses the default mode)",
                config.ocr.engine_mode
            );
        }

        tracing::info!("Tesseract engine initialized (tessdata: {})", tessdata_path);

        Ok(Self { tessdata_path })
    }

    /// Load the image into a fresh Tesseract instance and run recognition
    fn recognize(
        &self,
        image: &GrayImage,
        params: &RecognitionParams<'_>,
    ) -> Result<Tesseract, OcrError> {
        let (width, height) = image.dimensions();

        // Convert to BMP in memory (BMP is always supported by leptonica)
        let mut bmp_data = Vec::new();
        {
            let mut cursor = std::io::Cursor::new(&mut bmp_data);
            image
                .write_to(&mut cursor, image::ImageFormat::Bmp)
                .map_err(|e| {
                    OcrError::ProcessingError(format!("Failed to convert to BMP: {}", e))
                })?;
        }

        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(params.language))
            .map_err(|e| {
                OcrError::EngineFailure(format!(
                    "Failed to create Tesseract for '{}': {}",
                    params.language, e
                ))
            })?;

        tess = tess
            .set_variable("tessedit_pageseg_mode", &params.psm.to_string())
            .map_err(|e| OcrError::EngineFailure(format!("Failed to set PSM: {}", e)))?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrError::ProcessingError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess.recognize()
            .map_err(|e| OcrError::EngineFailure(format!("Failed to recognize text: {}", e)))
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize_words(
        &self,
        image: &GrayImage,
        params: &RecognitionParams<'_>,
    ) -> Result<Vec<Token>, OcrError> {
        let mut tess = self.recognize(image, params)?;
        let tsv = tess
            .get_tsv_text(0)
            .map_err(|e| OcrError::EngineFailure(format!("Failed to get TSV: {}", e)))?;
        Ok(tsv::parse_words(&tsv))
    }

    fn recognize_text(
        &self,
        image: &GrayImage,
        params: &RecognitionParams<'_>,
    ) -> Result<String, OcrError> {
        let mut tess = self.recognize(image, params)?;
        tess.get_text()
            .map_err(|e| OcrError::EngineFailure(format!("Failed to get text: {}", e)))
    }
}

// ============================================================================
// Tessdata download helpers
// ============================================================================

/// Ensure tessdata is available for every language component, downloading if needed
fn ensure_tessdata_available(languages: &[String]) -> Result<String, OcrError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("slide-label-ocr")
        .join("tessdata");

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create tessdata directory: {}", e))
    })?;

    for component in language_components(languages) {
        let traineddata_path = cache_dir.join(format!("{}.traineddata", component));
        if traineddata_path.exists() {
            tracing::debug!("Using cached tessdata for '{}'", component);
            continue;
        }

        tracing::info!(
            "Downloading tessdata for '{}' (this may take a moment)...",
            component
        );
        download_file(&tessdata_url(component), &traineddata_path)?;
        tracing::info!("Downloaded tessdata to {:?}", traineddata_path);
    }

    // Tesseract expects the directory, not the file
    cache_dir
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| OcrError::InitializationError("Invalid tessdata path".to_string()))
}

/// Split combined tags ("jpn+eng") into unique traineddata names
fn language_components(languages: &[String]) -> Vec<&str> {
    let mut components: Vec<&str> = Vec::new();
    for part in languages.iter().flat_map(|l| l.split('+')) {
        let part = part.trim();
        if !part.is_empty() && !components.contains(&part) {
            components.push(part);
        }
    }
    components
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // tessdata_fast keeps downloads small
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::InitializationError(format!("Failed to download tessdata: {}", e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrError::InitializationError(format!("Failed to read tessdata response: {}", e))
    })?;

    // Partial downloads must never be mistaken for cached data
    let tmp_path = path.with_extension("traineddata.part");
    let mut file = File::create(&tmp_path).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create tessdata file: {}", e))
    })?;
    file.write_all(&buffer).map_err(|e| {
        OcrError::InitializationError(format!("Failed to write tessdata file: {}", e))
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        OcrError::InitializationError(format!("Failed to move tessdata into place: {}", e))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_components_splits_and_dedups() {
        let languages = vec!["jpn+eng".to_string(), "jpn".to_string(), "eng".to_string()];
        assert_eq!(language_components(&languages), vec!["jpn", "eng"]);
    }

    #[test]
    fn test_tessdata_url() {
        assert!(tessdata_url("jpn").ends_with("/jpn.traineddata"));
    }
}
