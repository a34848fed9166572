use crate::config::OcrConfig;
use crate::error::OcrError;
use image::{DynamicImage, GrayImage};
use std::time::Instant;

use super::steps;

/// Fixed-order preprocessing applied to every candidate before OCR:
/// grayscale, upscale, autocontrast, contrast gain, optional threshold,
/// optional unsharp mask
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipeline {
    upscale_factor: u32,
    binarize_threshold: Option<u8>,
    sharpen: bool,
}

impl Pipeline {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            upscale_factor: config.upscale_factor,
            binarize_threshold: config.binarize_threshold,
            sharpen: config.sharpen_enabled,
        }
    }

    /// Process an image; the output is always single-channel
    pub fn process(&self, image: DynamicImage) -> Result<GrayImage, OcrError> {
        let start = Instant::now();
        let mut img = image;

        img = run_step("grayscale", img, steps::grayscale::apply)?;
        img = run_step("upscale", img, |i| {
            steps::resize::apply(i, self.upscale_factor)
        })?;
        img = run_step("autocontrast", img, steps::normalize::apply)?;
        img = run_step("contrast", img, |i| {
            steps::contrast::apply(i, steps::contrast::CONTRAST_GAIN)
        })?;

        if let Some(threshold) = self.binarize_threshold {
            img = run_step("threshold", img, |i| steps::threshold::apply(i, threshold))?;
        }

        if self.sharpen {
            img = run_step("sharpen", img, steps::sharpen::apply)?;
        }

        tracing::trace!(
            "Preprocessed to {}x{} in {}ms",
            img.width(),
            img.height(),
            start.elapsed().as_millis()
        );

        Ok(img.into_luma8())
    }
}

fn run_step<F>(name: &str, img: DynamicImage, step_fn: F) -> Result<DynamicImage, OcrError>
where
    F: FnOnce(DynamicImage) -> Result<DynamicImage, OcrError>,
{
    let step_start = Instant::now();
    let result = step_fn(img)?;
    tracing::trace!(
        step = name,
        time_us = step_start.elapsed().as_micros() as u64,
        "preprocessing step done"
    );
    Ok(result)
}
