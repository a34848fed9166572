//! Label region detection
//!
//! Slide macro images show the label on the left, separated from the glass
//! by a dark vertical bar (the slide holder edge). The locator finds that bar
//! in the column intensity profile and crops everything to its left.

use image::{DynamicImage, GrayImage, Luma};
use serde::Serialize;

/// Vertical band used for the column profile, as fractions of the height
pub const PROFILE_BAND: (f32, f32) = (0.15, 0.85);

/// Column means below this are treated as part of the separator bar
const DARK_THRESHOLD: f32 = 60.0;

/// Horizontal range searched for the separator, as fractions of the width
const SEARCH_RANGE: (f32, f32) = (0.10, 0.70);

/// Narrowest crop allowed when a separator is found
const MIN_CROP_RATIO: f32 = 0.20;

/// Columns kept to the right of the separator start
const SEPARATOR_MARGIN: u32 = 10;

/// Minimum run length in columns; the effective minimum also scales with width
const MIN_RUN_COLUMNS: u32 = 6;
const MIN_RUN_RATIO: f32 = 0.01;

/// Pixel rectangle `(left, top, right, bottom)`, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width.max(1),
            bottom: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Cut the box out of `image`
    ///
    /// An empty source yields a 1x1 white image so later steps never see an
    /// empty buffer.
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        if image.width() == 0 || image.height() == 0 {
            return DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([255])));
        }
        image.crop_imm(self.left, self.top, self.width(), self.height())
    }
}

/// Mean intensity of every column over rows `[floor(start·H), floor(end·H))`
///
/// Falls back to the full height when the band is empty (very short images).
pub fn column_profile(gray: &GrayImage, band: (f32, f32)) -> Vec<f32> {
    let (width, height) = gray.dimensions();
    let mut y0 = (height as f32 * band.0) as u32;
    let mut y1 = (height as f32 * band.1) as u32;
    if y1 <= y0 {
        y0 = 0;
        y1 = height;
    }
    y1 = y1.min(height);

    let rows = (y1 - y0) as f32;
    if rows == 0.0 {
        return vec![0.0; width as usize];
    }

    let mut sums = vec![0u64; width as usize];
    for y in y0..y1 {
        for (x, sum) in sums.iter_mut().enumerate() {
            *sum += gray.get_pixel(x as u32, y).0[0] as u64;
        }
    }

    sums.into_iter().map(|s| s as f32 / rows).collect()
}

/// Locate the label region of a slide macro/label image
pub fn find_label_crop_box(image: &DynamicImage, crop_enabled: bool, label_width_ratio: f32) -> CropBox {
    let (width, height) = (image.width(), image.height());
    if !crop_enabled || width == 0 || height == 0 {
        return CropBox::full(width, height);
    }

    let gray = image.to_luma8();
    let profile = column_profile(&gray, PROFILE_BAND);

    let right = match find_separator(&profile, width) {
        Some(start) => {
            let min_right = (width as f32 * MIN_CROP_RATIO) as u32;
            let right = min_right.max(start + SEPARATOR_MARGIN).min(width);
            tracing::debug!(
                "Separator bar at column {} of {}, cropping to {}",
                start,
                width,
                right
            );
            right
        }
        None => {
            let right = (width as f32 * label_width_ratio) as u32;
            tracing::debug!(
                "No separator bar found, falling back to {} of {} columns",
                right,
                width
            );
            right
        }
    };

    CropBox {
        left: 0,
        top: 0,
        right: right.clamp(1, width),
        bottom: height,
    }
}

/// Start column of the longest dark run inside the search range
///
/// Runs shorter than the minimum bar width are ignored; among equally long
/// runs the leftmost wins.
fn find_separator(profile: &[f32], width: u32) -> Option<u32> {
    let mut x_start = (width as f32 * SEARCH_RANGE.0) as usize;
    let mut x_end = (width as f32 * SEARCH_RANGE.1) as usize;
    if x_end <= x_start {
        x_start = 0;
        x_end = width as usize;
    }
    let x_end = x_end.min(profile.len());
    let min_run = MIN_RUN_COLUMNS.max((width as f32 * MIN_RUN_RATIO) as u32) as usize;

    let is_dark = |i: usize| profile[i] < DARK_THRESHOLD;

    // (run_len, start)
    let mut best: Option<(usize, usize)> = None;
    let mut i = x_start;
    while i < x_end {
        if !is_dark(i) {
            i += 1;
            continue;
        }

        let mut j = i;
        while j < x_end && is_dark(j) {
            j += 1;
        }

        let run_len = j - i;
        if run_len >= min_run && best.map_or(true, |(len, _)| run_len > len) {
            best = Some((run_len, i));
        }

        i = j;
    }

    best.map(|(_, start)| start as u32)
}
