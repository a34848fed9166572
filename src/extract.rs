//! Label text extraction: crop, search, final recognition

use crate::candidates::{Candidate, CandidateSpace};
use crate::config::OcrConfig;
use crate::crop::{find_label_crop_box, CropBox};
use crate::engine::{OcrEngine, RecognitionParams};
use crate::error::OcrError;
use crate::scoring::score_candidate;
use crate::selector::select_best;
use image::DynamicImage;
use serde::Serialize;

/// Result of one label OCR run
#[derive(Debug, Clone, Serialize)]
pub struct LabelText {
    /// Engine output for the winning candidate, untrimmed
    pub text: String,
    pub confidence: f32,
    pub language: Option<String>,
    pub psm: Option<u32>,
    pub rotation: Option<i32>,
    pub trimmed: bool,
    pub candidates_scored: usize,
    pub candidates_total: usize,
    pub early_stopped: bool,
    pub crop: CropBox,
}

/// OCR a label image and return only the text
pub fn extract_text(
    image: &DynamicImage,
    config: &OcrConfig,
    engine: &dyn OcrEngine,
) -> Result<String, OcrError> {
    extract_label(image, config, engine).map(|label| label.text)
}

/// OCR a label image, reporting which candidate won
///
/// Performs no I/O of its own; every engine call blocks. With an empty
/// language or PSM list the engine is never called and the text is empty.
pub fn extract_label(
    image: &DynamicImage,
    config: &OcrConfig,
    engine: &dyn OcrEngine,
) -> Result<LabelText, OcrError> {
    let crop = find_label_crop_box(image, config.crop_label_enabled, config.label_width_ratio);
    let label = crop.apply(image);

    let space = CandidateSpace::new(&label, config);
    let candidates_total = space.len();
    tracing::debug!(
        "Label crop {:?}, {} candidates (rotations {:?})",
        crop,
        candidates_total,
        space.rotations()
    );

    let selection = select_best(&space, config.early_stop_confidence, |candidate| {
        score_candidate(engine, candidate, config.engine_mode)
    })?;

    let Some(best) = selection.best else {
        tracing::warn!("No OCR candidates (empty language or PSM list)");
        return Ok(LabelText {
            text: String::new(),
            confidence: 0.0,
            language: None,
            psm: None,
            rotation: None,
            trimmed: false,
            candidates_scored: 0,
            candidates_total,
            early_stopped: false,
            crop,
        });
    };

    let text = final_text(engine, &best.candidate, config.engine_mode)?;

    tracing::info!(
        "Selected lang={} psm={} rotation={}{} at confidence {:.1} after {}/{} candidates",
        best.candidate.language,
        best.candidate.psm,
        best.candidate.rotation,
        if best.candidate.trimmed { " (trimmed)" } else { "" },
        best.confidence,
        selection.scored,
        candidates_total
    );

    Ok(LabelText {
        text,
        confidence: best.confidence,
        language: Some(best.candidate.language.to_string()),
        psm: Some(best.candidate.psm),
        rotation: Some(best.candidate.rotation),
        trimmed: best.candidate.trimmed,
        candidates_scored: selection.scored,
        candidates_total,
        early_stopped: selection.early_stopped,
        crop,
    })
}

/// Plain-text recognition of the winning candidate, exactly once
fn final_text(
    engine: &dyn OcrEngine,
    candidate: &Candidate<'_>,
    engine_mode: u32,
) -> Result<String, OcrError> {
    let params = RecognitionParams {
        language: candidate.language,
        psm: candidate.psm,
        engine_mode,
    };
    engine.recognize_text(&candidate.image, &params)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::Token;
    use image::{GrayImage, Luma};
    use std::sync::Mutex;

    /// Engine that replays scripted word confidences and records every call
    pub(crate) struct ScriptedEngine {
        scores: Mutex<Vec<f32>>,
        pub calls: Mutex<Vec<(String, String, u32, (u32, u32))>>,
        fail_language: Option<String>,
    }

    impl ScriptedEngine {
        pub(crate) fn new(scores: &[f32]) -> Self {
            Self {
                scores: Mutex::new(scores.iter().rev().copied().collect()),
                calls: Mutex::new(Vec::new()),
                fail_language: None,
            }
        }

        pub(crate) fn failing_on(language: &str) -> Self {
            Self {
                fail_language: Some(language.to_string()),
                ..Self::new(&[])
            }
        }

        fn record(&self, mode: &str, image: &GrayImage, params: &RecognitionParams<'_>) {
            self.calls.lock().unwrap().push((
                mode.to_string(),
                params.language.to_string(),
                params.psm,
                image.dimensions(),
            ));
        }

        pub(crate) fn count(&self, mode: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| c.0 == mode).count()
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn recognize_words(
            &self,
            image: &GrayImage,
            params: &RecognitionParams<'_>,
        ) -> Result<Vec<Token>, OcrError> {
            self.record("words", image, params);
            if self.fail_language.as_deref() == Some(params.language) {
                return Err(OcrError::EngineFailure(format!(
                    "Failed loading language '{}'",
                    params.language
                )));
            }
            let score = self.scores.lock().unwrap().pop().unwrap_or(0.0);
            Ok(vec![Token {
                text: "LABEL".to_string(),
                confidence: Some(score),
            }])
        }

        fn recognize_text(
            &self,
            image: &GrayImage,
            params: &RecognitionParams<'_>,
        ) -> Result<String, OcrError> {
            self.record("text", image, params);
            Ok(format!("{} psm{}\n", params.language, params.psm))
        }
    }

    fn slide_macro() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(60, 20, |x, _| {
            if (25..33).contains(&x) {
                Luma([10])
            } else {
                Luma([235])
            }
        }))
    }

    fn config() -> OcrConfig {
        OcrConfig {
            upscale_factor: 1,
            sharpen_enabled: false,
            ..OcrConfig::default()
        }
    }

    #[test]
    fn test_early_stop_winner_is_extracted() {
        let engine = ScriptedEngine::new(&[70.0, 95.0, 99.0]);
        let label = extract_label(&slide_macro(), &config(), &engine).unwrap();

        assert_eq!(engine.count("words"), 2);
        assert_eq!(engine.count("text"), 1);
        assert!(label.early_stopped);
        assert_eq!(label.confidence, 95.0);
        // Second candidate: jpn+eng, psm 6, rotation 0, trimmed
        assert!(label.trimmed);
        assert_eq!(label.rotation, Some(0));
        assert_eq!(label.text, "jpn+eng psm6\n");
    }

    #[test]
    fn test_full_scan_picks_highest() {
        let scores = [10.0, 20.0, 60.0, 30.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0];
        let engine = ScriptedEngine::new(&scores);
        let label = extract_label(&slide_macro(), &config(), &engine).unwrap();

        assert_eq!(engine.count("words"), 12);
        assert_eq!(label.candidates_total, 12);
        assert_eq!(label.confidence, 60.0);
        assert_eq!(label.rotation, Some(-90));
        assert_eq!(label.language.as_deref(), Some("jpn+eng"));
        assert_eq!(label.psm, Some(6));
        assert!(!label.early_stopped);
    }

    #[test]
    fn test_final_call_uses_winning_image() {
        let scores = [10.0, 20.0, 80.0];
        let engine = ScriptedEngine::new(&scores);
        extract_label(&slide_macro(), &config(), &engine).unwrap();

        let calls = engine.calls.lock().unwrap();
        let winner = &calls[2];
        let last = calls.last().unwrap();
        assert_eq!(last.0, "text");
        assert_eq!((&last.1, last.2, last.3), (&winner.1, winner.2, winner.3));
    }

    #[test]
    fn test_empty_language_list_skips_engine() {
        let engine = ScriptedEngine::new(&[99.0]);
        let config = OcrConfig {
            language_candidates: Vec::new(),
            ..config()
        };
        let text = extract_text(&slide_macro(), &config, &engine).unwrap();
        assert_eq!(text, "");
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_psm_list_skips_engine() {
        let engine = ScriptedEngine::new(&[99.0]);
        let config = OcrConfig {
            psm_candidates: Vec::new(),
            ..config()
        };
        let label = extract_label(&slide_macro(), &config, &engine).unwrap();
        assert_eq!(label.text, "");
        assert_eq!(label.candidates_scored, 0);
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_engine_failure_propagates() {
        let engine = ScriptedEngine::failing_on("jpn+eng");
        let err = extract_text(&slide_macro(), &config(), &engine).unwrap_err();
        assert!(matches!(err, OcrError::EngineFailure(_)));
        assert_eq!(engine.count("words"), 1);
        assert_eq!(engine.count("text"), 0);
    }

    #[test]
    fn test_crop_feeds_candidates() {
        let engine = ScriptedEngine::new(&[99.0]);
        let label = extract_label(&slide_macro(), &config(), &engine).unwrap();
        // Bar starts at 25 -> right edge 35; candidate is padded by 20 per side
        assert_eq!(label.crop.right, 35);
        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls[0].3, (75, 60));
    }

    #[test]
    fn test_degenerate_image_still_runs() {
        let engine = ScriptedEngine::new(&[99.0]);
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let text = extract_text(&empty, &config(), &engine).unwrap();
        assert_eq!(text, "jpn+eng psm6\n");
    }
}
