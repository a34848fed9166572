use crate::error::OcrError;
use image::GrayImage;

/// Per-call recognition settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionParams<'a> {
    /// Tesseract language tag, e.g. "jpn+eng"
    pub language: &'a str,
    /// Page segmentation mode
    pub psm: u32,
    /// OCR engine mode
    pub engine_mode: u32,
}

/// One word reported by the engine's data mode
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    /// 0-100; `None` when the engine reported no usable value
    pub confidence: Option<f32>,
}

/// Trait that all OCR engines must implement
///
/// Both calls block until the engine returns. Failures (missing binary,
/// unknown language pack) are reported as errors and never retried.
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract-cli")
    fn name(&self) -> &'static str;

    /// Recognize the image and report word-level confidences
    fn recognize_words(
        &self,
        image: &GrayImage,
        params: &RecognitionParams<'_>,
    ) -> Result<Vec<Token>, OcrError>;

    /// Recognize the image to plain text
    fn recognize_text(
        &self,
        image: &GrayImage,
        params: &RecognitionParams<'_>,
    ) -> Result<String, OcrError>;
}
