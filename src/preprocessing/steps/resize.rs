use crate::error::OcrError;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Largest side produced by upscaling; keeps memory bounded on big inputs
const MAX_DIMENSION: u32 = 16_000;

/// Upscale by an integer factor with Lanczos3 resampling
/// Label thumbnails are a few hundred pixels wide, far below the glyph size
/// Tesseract expects, so they are magnified rather than resized to a target DPI
pub fn apply(image: DynamicImage, factor: u32) -> Result<DynamicImage, OcrError> {
    let (width, height) = image.dimensions();
    let factor = effective_factor(width, height, factor);
    if factor <= 1 {
        return Ok(image);
    }

    Ok(image.resize_exact(width * factor, height * factor, FilterType::Lanczos3))
}

/// Clamp the factor so neither side exceeds MAX_DIMENSION
fn effective_factor(width: u32, height: u32, factor: u32) -> u32 {
    let longest = width.max(height).max(1);
    let limit = (MAX_DIMENSION / longest).max(1);
    if factor > limit {
        tracing::debug!(
            "Upscale factor {} reduced to {} for {}x{} input",
            factor,
            limit,
            width,
            height
        );
        return limit;
    }
    factor
}
