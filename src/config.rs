use crate::cli::{Args, EngineKind};
use std::path::PathBuf;

/// Languages tried after the primary one when no explicit candidate list is given
const FALLBACK_LANGUAGES: [&str; 2] = ["jpn+eng", "jpn"];

/// Search space and preprocessing settings for one label OCR run
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    /// Tesseract language tags tried in order (e.g. "jpn+eng")
    pub language_candidates: Vec<String>,
    /// Page segmentation modes tried in order (6 = block, 11 = sparse)
    pub psm_candidates: Vec<u32>,
    /// Tesseract OCR engine mode (`--oem`)
    pub engine_mode: u32,
    /// Integer magnification applied before OCR
    pub upscale_factor: u32,
    /// Global binarization threshold; `None` disables it
    pub binarize_threshold: Option<u8>,
    pub sharpen_enabled: bool,
    pub auto_rotate: bool,
    /// Overrides both `auto_rotate` and `rotation_candidates` when set
    pub forced_rotation_degrees: Option<i32>,
    /// Counter-clockwise degrees tried when `auto_rotate` is on
    pub rotation_candidates: Vec<i32>,
    pub crop_label_enabled: bool,
    /// Fraction of the width kept when no separator bar is found
    pub label_width_ratio: f32,
    /// A candidate scoring at least this stops the search
    pub early_stop_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language_candidates: vec!["jpn+eng".to_string(), "jpn".to_string()],
            psm_candidates: vec![6, 11],
            engine_mode: 3,
            upscale_factor: 6,
            binarize_threshold: None,
            sharpen_enabled: true,
            auto_rotate: true,
            forced_rotation_degrees: None,
            rotation_candidates: vec![0, -90],
            crop_label_enabled: true,
            label_width_ratio: 0.33,
            early_stop_confidence: 75.0,
        }
    }
}

impl OcrConfig {
    /// Rotation degrees actually iterated by the candidate search
    pub fn rotations(&self) -> Vec<i32> {
        if let Some(deg) = self.forced_rotation_degrees {
            return vec![deg];
        }
        if self.auto_rotate {
            return self.rotation_candidates.clone();
        }
        vec![0]
    }
}

/// Runtime configuration for the binary
#[derive(Debug, Clone)]
pub struct Config {
    pub ocr: OcrConfig,
    pub engine: EngineKind,
    pub tesseract_path: PathBuf,
    pub tessdata_path: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub batch_root: Option<PathBuf>,
    pub jobs: usize,
    pub dry_run: bool,
    pub json: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let language_candidates = match args.lang_candidates {
            Some(list) => dedup(list.into_iter().map(|s| s.trim().to_string())),
            None => dedup(
                std::iter::once(args.lang.trim().to_string())
                    .chain(FALLBACK_LANGUAGES.iter().map(|s| s.to_string())),
            ),
        };

        let ocr = OcrConfig {
            language_candidates,
            psm_candidates: dedup(args.psm_candidates.into_iter()),
            engine_mode: args.oem,
            upscale_factor: args.upscale.max(1),
            binarize_threshold: args.threshold,
            sharpen_enabled: !args.no_sharpen,
            auto_rotate: !args.no_auto_rotate,
            forced_rotation_degrees: args.rotate,
            rotation_candidates: args.rotation_candidates,
            crop_label_enabled: !args.no_crop_label,
            label_width_ratio: args.label_width_ratio,
            early_stop_confidence: args.early_stop,
        };

        Self {
            ocr,
            engine: args.engine,
            tesseract_path: args.tesseract_path,
            tessdata_path: args.tessdata_path,
            input: args.input,
            output: args.output,
            batch_root: args.batch,
            jobs: args.jobs.max(1),
            dry_run: args.dry_run,
            json: args.json,
        }
    }
}

/// Drop empty and repeated entries, keeping first-seen order
fn dedup<T, I>(items: I) -> Vec<T>
where
    T: PartialEq + IsBlank,
    I: Iterator<Item = T>,
{
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !item.is_blank() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

trait IsBlank {
    fn is_blank(&self) -> bool;
}

impl IsBlank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl IsBlank for u32 {
    fn is_blank(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["slide-label-ocr"];
        argv.extend_from_slice(args);
        Config::from(Args::parse_from(argv))
    }

    #[test]
    fn test_forced_rotation_overrides_candidates() {
        let config = OcrConfig {
            forced_rotation_degrees: Some(180),
            rotation_candidates: vec![0, -90, 90],
            ..OcrConfig::default()
        };
        assert_eq!(config.rotations(), vec![180]);
    }

    #[test]
    fn test_rotations_without_auto_rotate() {
        let config = OcrConfig {
            auto_rotate: false,
            ..OcrConfig::default()
        };
        assert_eq!(config.rotations(), vec![0]);
    }

    #[test]
    fn test_rotations_with_auto_rotate() {
        assert_eq!(OcrConfig::default().rotations(), vec![0, -90]);
    }

    #[test]
    fn test_default_languages_are_deduplicated() {
        let config = parse(&["label.png"]);
        assert_eq!(config.ocr.language_candidates, vec!["jpn+eng", "jpn"]);

        let config = parse(&["--lang", "eng", "label.png"]);
        assert_eq!(config.ocr.language_candidates, vec!["eng", "jpn+eng", "jpn"]);
    }

    #[test]
    fn test_explicit_candidate_lists() {
        let config = parse(&[
            "--lang-candidates",
            "eng, jpn_vert,,eng",
            "--psm-candidates",
            "4,3,4",
            "label.png",
        ]);
        assert_eq!(config.ocr.language_candidates, vec!["eng", "jpn_vert"]);
        assert_eq!(config.ocr.psm_candidates, vec![4, 3]);
    }

    #[test]
    fn test_flags_map_to_ocr_config() {
        let config = parse(&[
            "--no-crop-label",
            "--no-auto-rotate",
            "--no-sharpen",
            "--threshold",
            "160",
            "--rotate",
            "-90",
            "--upscale",
            "0",
            "label.png",
        ]);
        assert!(!config.ocr.crop_label_enabled);
        assert!(!config.ocr.auto_rotate);
        assert!(!config.ocr.sharpen_enabled);
        assert_eq!(config.ocr.binarize_threshold, Some(160));
        assert_eq!(config.ocr.forced_rotation_degrees, Some(-90));
        assert_eq!(config.ocr.upscale_factor, 1);
        assert_eq!(config.ocr.rotations(), vec![-90]);
    }
}
