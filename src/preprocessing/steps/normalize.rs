use crate::error::OcrError;
use image::{DynamicImage, GrayImage};

/// Autocontrast: stretch the [min, max] intensity range to [0, 255]
/// Uniform images are returned unchanged
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    let mut gray = image.into_luma8();
    let (min_val, max_val) = find_min_max(&gray);

    if max_val <= min_val {
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    let lut = stretch_lut(min_val, max_val);
    for pixel in gray.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }

    Ok(DynamicImage::ImageLuma8(gray))
}

fn stretch_lut(min_val: u8, max_val: u8) -> [u8; 256] {
    let scale = 255.0 / (max_val - min_val) as f32;
    let offset = -(min_val as f32) * scale;
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = (i as f32 * scale + offset).clamp(0.0, 255.0) as u8;
    }
    lut
}

pub(crate) fn find_min_max(img: &GrayImage) -> (u8, u8) {
    let mut min = 255u8;
    let mut max = 0u8;

    for pixel in img.pixels() {
        let val = pixel.0[0];
        min = min.min(val);
        max = max.max(val);
    }

    (min, max)
}
