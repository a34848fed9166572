use crate::error::OcrError;
use image::DynamicImage;

/// Convert image to single-channel 8-bit grayscale
/// Every later step assumes Luma8 input
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    match image {
        DynamicImage::ImageLuma8(_) => Ok(image),
        other => Ok(DynamicImage::ImageLuma8(other.to_luma8())),
    }
}
