use crate::error::OcrError;
use image::{imageops, DynamicImage, GrayImage, Luma};

/// Border added on every side, in source pixels (grows with the upscale)
pub const BORDER_PX: u32 = 20;

/// Surround the image with a uniform white border
/// Glyphs touching the crop edge are otherwise dropped by Tesseract's own margin handling
pub fn apply(image: DynamicImage, border: u32) -> Result<DynamicImage, OcrError> {
    let gray = image.into_luma8();
    if border == 0 {
        return Ok(DynamicImage::ImageLuma8(gray));
    }

    let (width, height) = gray.dimensions();
    let mut canvas = GrayImage::from_pixel(width + 2 * border, height + 2 * border, Luma([255]));
    imageops::replace(&mut canvas, &gray, border as i64, border as i64);

    Ok(DynamicImage::ImageLuma8(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_adds_white_border() {
        let img = GrayImage::from_pixel(10, 4, Luma([0]));
        let result = apply(DynamicImage::ImageLuma8(img), BORDER_PX).unwrap();
        let gray = result.as_luma8().unwrap();

        assert_eq!(gray.dimensions(), (50, 44));
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(19, 21).0[0], 255);
        assert_eq!(gray.get_pixel(20, 20).0[0], 0);
        assert_eq!(gray.get_pixel(29, 23).0[0], 0);
        assert_eq!(gray.get_pixel(30, 23).0[0], 255);
    }

    #[test]
    fn test_zero_border_is_noop() {
        let img = GrayImage::from_pixel(3, 3, Luma([9]));
        let result = apply(DynamicImage::ImageLuma8(img.clone()), 0).unwrap();
        assert_eq!(result.as_luma8(), Some(&img));
    }
}
