use crate::error::OcrError;
use image::DynamicImage;

/// Share of the height removed by the trim-bottom variant
pub const BOTTOM_FRACTION: f32 = 0.25;

/// Drop the bottom `fraction` of rows, always keeping at least one row
/// Targets footer bands (barcodes, QR codes) that drag word confidences down
pub fn apply(image: DynamicImage, fraction: f32) -> Result<DynamicImage, OcrError> {
    let gray = image.into_luma8();
    let (width, height) = gray.dimensions();

    let cut = (height as f32 * fraction).floor() as u32;
    let kept = height.saturating_sub(cut).max(1);
    if kept >= height {
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    let trimmed = image::imageops::crop_imm(&gray, 0, 0, width, kept).to_image();
    Ok(DynamicImage::ImageLuma8(trimmed))
}
