use crate::error::OcrError;
use image::{imageops, DynamicImage, GrayImage, Luma};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// Fill for canvas areas uncovered by non-right-angle rotations
/// White to match the label paper and the padding border, not black
const BACKGROUND: Luma<u8> = Luma([255]);

/// Rotate counter-clockwise by `degrees`, expanding the canvas so nothing is clipped
/// Right angles are exact pixel permutations
pub fn apply(image: DynamicImage, degrees: i32) -> Result<DynamicImage, OcrError> {
    let gray = image.into_luma8();

    let rotated = match degrees.rem_euclid(360) {
        0 => gray,
        90 => imageops::rotate270(&gray),
        180 => imageops::rotate180(&gray),
        270 => imageops::rotate90(&gray),
        other => rotate_expanded(&gray, other as f32),
    };

    Ok(DynamicImage::ImageLuma8(rotated))
}

fn rotate_expanded(gray: &GrayImage, degrees: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());

    let new_width = (width as f32 * cos + height as f32 * sin).ceil() as u32;
    let new_height = (width as f32 * sin + height as f32 * cos).ceil() as u32;

    let mut canvas = GrayImage::from_pixel(new_width.max(1), new_height.max(1), BACKGROUND);
    let x = (new_width as i64 - width as i64) / 2;
    let y = (new_height as i64 - height as i64) / 2;
    imageops::overlay(&mut canvas, gray, x, y);

    // imageproc rotates clockwise for positive angles
    rotate_about_center(&canvas, -radians, Interpolation::Bilinear, BACKGROUND)
}
