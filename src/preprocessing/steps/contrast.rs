use crate::error::OcrError;
use image::DynamicImage;

/// Contrast gain applied after autocontrast
pub const CONTRAST_GAIN: f32 = 1.5;

/// Push pixels away from the image mean: out = mean + gain * (px - mean)
pub fn apply(image: DynamicImage, gain: f32) -> Result<DynamicImage, OcrError> {
    let mut gray = image.into_luma8();
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    let mean = (sum as f64 / count as f64 + 0.5).floor() as f32;

    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = (mean + gain * (i as f32 - mean)).clamp(0.0, 255.0) as u8;
    }
    for pixel in gray.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }

    Ok(DynamicImage::ImageLuma8(gray))
}
