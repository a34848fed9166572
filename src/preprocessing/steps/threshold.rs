use crate::error::OcrError;
use image::DynamicImage;

/// Global binarization: pixels at or above the threshold become white,
/// everything else black. Output stays Luma8.
pub fn apply(image: DynamicImage, threshold: u8) -> Result<DynamicImage, OcrError> {
    let mut gray = image.into_luma8();
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] >= threshold { 255 } else { 0 };
    }
    Ok(DynamicImage::ImageLuma8(gray))
}
