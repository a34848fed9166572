//! Confidence-driven OCR for slide label thumbnails
//!
//! The label region is cropped from a slide macro image, then a search over
//! rotations, languages and page segmentation modes keeps the candidate the
//! OCR engine is most confident about. See [`extract_text`].

pub mod batch;
pub mod candidates;
pub mod cli;
pub mod config;
pub mod crop;
pub mod engine;
pub mod engines;
pub mod error;
pub mod extract;
pub mod output;
pub mod preprocessing;
pub mod scoring;
pub mod selector;

pub use config::OcrConfig;
pub use engine::OcrEngine;
pub use error::OcrError;
pub use extract::{extract_label, extract_text, LabelText};
