use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR engine failed: {0}")]
    EngineFailure(String),

    #[error("Failed to process image: {0}")]
    ProcessingError(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write output {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl OcrError {
    /// Stable identifier used in JSON reports and batch summaries
    pub fn code(&self) -> &'static str {
        match self {
            OcrError::InitializationError(_) => "INIT_ERROR",
            OcrError::EngineUnavailable(_) => "ENGINE_UNAVAILABLE",
            OcrError::EngineFailure(_) => "ENGINE_FAILURE",
            OcrError::ProcessingError(_) => "PROCESSING_ERROR",
            OcrError::PreprocessingError(_) => "PREPROCESSING_ERROR",
            OcrError::InvalidConfig(_) => "INVALID_CONFIG",
            OcrError::Output { .. } => "OUTPUT_ERROR",
        }
    }
}
