//! Image preprocessing for label OCR
//!
//! Geometry steps (rotate, trim, pad) shape each candidate; the pipeline then
//! normalizes it for the OCR engine.

pub mod pipeline;
pub mod steps;

pub use pipeline::Pipeline;
