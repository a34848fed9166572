use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Rotations accepted by `--rotate`
const ALLOWED_ROTATIONS: [i32; 5] = [0, 90, 180, 270, -90];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Run the `tesseract` executable found on PATH (or --tesseract-path)
    TesseractCli,
    /// Statically linked Tesseract (requires the `engine-tesseract` feature)
    Tesseract,
}

#[derive(Parser, Debug)]
#[command(name = "slide-label-ocr")]
#[command(about = "OCR for slide label thumbnails with a confidence-driven candidate search")]
#[command(version)]
#[command(group = clap::ArgGroup::new("source").required(true).args(["input", "batch"]))]
pub struct Args {
    /// Label or macro image to OCR
    pub input: Option<PathBuf>,

    /// Write the text here (atomically) instead of stdout
    #[arg(short, long, requires = "input")]
    pub output: Option<PathBuf>,

    /// OCR every image under this directory, writing <stem>.ocr.txt beside each
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Parallel images in batch mode
    #[arg(long, env = "OCR_JOBS", default_value = "4")]
    pub jobs: usize,

    /// Print planned batch work without running OCR or writing files
    #[arg(long, requires = "batch")]
    pub dry_run: bool,

    /// Print a JSON report instead of plain text
    #[arg(long)]
    pub json: bool,

    /// OCR backend
    #[arg(long, env = "OCR_ENGINE", value_enum, default_value = "tesseract-cli")]
    pub engine: EngineKind,

    /// Tesseract executable used by the tesseract-cli engine
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    pub tesseract_path: PathBuf,

    /// Path to tessdata directory
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<PathBuf>,

    /// Primary OCR language, e.g. "jpn+eng"
    #[arg(long, env = "OCR_LANG", default_value = "jpn+eng")]
    pub lang: String,

    /// Comma-separated languages, e.g. "jpn+eng,jpn,eng,jpn_vert" (overrides --lang)
    #[arg(long, value_delimiter = ',')]
    pub lang_candidates: Option<Vec<String>>,

    /// Comma-separated page segmentation modes, e.g. "6,11,4,3"
    #[arg(long, value_delimiter = ',', default_value = "6,11")]
    pub psm_candidates: Vec<u32>,

    /// Tesseract OCR engine mode
    #[arg(long, default_value = "3")]
    pub oem: u32,

    /// Integer upscale factor applied before OCR
    #[arg(long, default_value = "6")]
    pub upscale: u32,

    /// Binarization threshold (0-255); disabled when absent
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Force a single rotation (counter-clockwise degrees)
    #[arg(long, allow_negative_numbers = true, value_parser = parse_rotation)]
    pub rotate: Option<i32>,

    /// Rotations tried when auto-rotate is on
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "0,-90",
        allow_negative_numbers = true
    )]
    pub rotation_candidates: Vec<i32>,

    /// Only try rotation 0
    #[arg(long)]
    pub no_auto_rotate: bool,

    /// OCR the whole image instead of the detected label region
    #[arg(long)]
    pub no_crop_label: bool,

    /// Skip the unsharp mask
    #[arg(long)]
    pub no_sharpen: bool,

    /// Fraction of the width kept when no separator bar is found
    #[arg(long, default_value = "0.33", value_parser = parse_ratio)]
    pub label_width_ratio: f32,

    /// Stop searching once a candidate reaches this mean confidence
    #[arg(long, default_value = "75.0")]
    pub early_stop: f32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

fn parse_rotation(s: &str) -> Result<i32, String> {
    let deg: i32 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid rotation '{}': {}", s, e))?;
    if ALLOWED_ROTATIONS.contains(&deg) {
        Ok(deg)
    } else {
        Err(format!("rotation must be one of {:?}", ALLOWED_ROTATIONS))
    }
}

fn parse_ratio(s: &str) -> Result<f32, String> {
    let ratio: f32 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid ratio '{}': {}", s, e))?;
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(ratio)
    } else {
        Err("ratio must be in (0, 1]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rotation_accepts_known_values() {
        assert_eq!(parse_rotation("-90"), Ok(-90));
        assert_eq!(parse_rotation("270"), Ok(270));
        assert!(parse_rotation("45").is_err());
        assert!(parse_rotation("up").is_err());
    }

    #[test]
    fn test_parse_ratio_bounds() {
        assert_eq!(parse_ratio("1.0"), Ok(1.0));
        assert!(parse_ratio("0").is_err());
        assert!(parse_ratio("1.5").is_err());
    }

    #[test]
    fn test_input_or_batch_required() {
        assert!(Args::try_parse_from(["slide-label-ocr"]).is_err());
        assert!(Args::try_parse_from(["slide-label-ocr", "label.png"]).is_ok());
        assert!(Args::try_parse_from(["slide-label-ocr", "--batch", "slides"]).is_ok());
    }

    #[test]
    fn test_dry_run_requires_batch() {
        assert!(Args::try_parse_from(["slide-label-ocr", "--dry-run", "label.png"]).is_err());
    }
}
