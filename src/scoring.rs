//! Candidate confidence scoring

use crate::candidates::Candidate;
use crate::engine::{OcrEngine, RecognitionParams, Token};
use crate::error::OcrError;

/// Mean word confidence, ignoring tokens that carry no signal
///
/// A token counts only when its confidence is present and non-negative and
/// its text contains at least one ASCII letter/digit or Japanese character
/// (kanji, hiragana, katakana). Returns 0.0 when nothing counts.
pub fn mean_confidence(tokens: &[Token]) -> f32 {
    let (sum, count) = tokens
        .iter()
        .filter(|t| has_word_char(&t.text))
        .filter_map(|t| t.confidence)
        .filter(|c| *c >= 0.0)
        .fold((0.0f64, 0usize), |(sum, count), c| (sum + c as f64, count + 1));

    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}

fn has_word_char(text: &str) -> bool {
    text.chars().any(|c| {
        c.is_ascii_alphanumeric()
            || ('\u{4E00}'..='\u{9FAF}').contains(&c)
            || ('\u{3041}'..='\u{3093}').contains(&c)
            || ('\u{30A1}'..='\u{30F3}').contains(&c)
    })
}

/// Run the engine's data mode on one candidate and reduce it to a score
pub fn score_candidate(
    engine: &dyn OcrEngine,
    candidate: &Candidate<'_>,
    engine_mode: u32,
) -> Result<f32, OcrError> {
    let params = RecognitionParams {
        language: candidate.language,
        psm: candidate.psm,
        engine_mode,
    };
    let tokens = engine.recognize_words(&candidate.image, &params)?;
    let score = mean_confidence(&tokens);

    tracing::debug!(
        lang = candidate.language,
        psm = candidate.psm,
        rotation = candidate.rotation,
        trimmed = candidate.trimmed,
        words = tokens.len(),
        "candidate scored {:.1}",
        score
    );

    Ok(score)
}
