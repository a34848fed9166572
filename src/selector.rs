//! Early-stop best-candidate search

use crate::error::OcrError;

/// A candidate together with its confidence
#[derive(Debug, Clone)]
pub struct ScoredCandidate<T> {
    pub confidence: f32,
    pub candidate: T,
}

/// Outcome of a search
#[derive(Debug, Clone)]
pub struct Selection<T> {
    /// `None` only when the candidate sequence was empty
    pub best: Option<ScoredCandidate<T>>,
    /// Number of scorer invocations
    pub scored: usize,
    /// Whether the search stopped on the early-stop threshold
    pub early_stopped: bool,
}

/// Score candidates in order and keep the best one
///
/// A later candidate replaces the current best only with a strictly greater
/// score. The first candidate scoring at least `early_stop` is adopted and the
/// search ends there, even if an earlier candidate scored the same or higher.
/// Generator and scorer errors abort the search.
pub fn select_best<T, I, F>(
    candidates: I,
    early_stop: f32,
    mut scorer: F,
) -> Result<Selection<T>, OcrError>
where
    I: IntoIterator<Item = Result<T, OcrError>>,
    F: FnMut(&T) -> Result<f32, OcrError>,
{
    let mut best: Option<ScoredCandidate<T>> = None;
    let mut scored = 0;

    for candidate in candidates {
        let candidate = candidate?;
        let confidence = scorer(&candidate)?;
        scored += 1;

        if confidence >= early_stop {
            tracing::debug!(
                "Early stop at candidate {} with confidence {:.1}",
                scored,
                confidence
            );
            return Ok(Selection {
                best: Some(ScoredCandidate {
                    confidence,
                    candidate,
                }),
                scored,
                early_stopped: true,
            });
        }

        let improves = match &best {
            None => true,
            Some(current) => confidence > current.confidence,
        };
        if improves {
            best = Some(ScoredCandidate {
                confidence,
                candidate,
            });
        }
    }

    Ok(Selection {
        best,
        scored,
        early_stopped: false,
    })
}
