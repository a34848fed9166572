//! Candidate generation for the confidence search
//!
//! A [`CandidateSpace`] owns the cropped label and yields a fresh, lazy
//! [`Candidates`] iterator on every call to [`CandidateSpace::iter`]. Images are
//! only built when the iteration reaches them, so an early stop skips the
//! remaining rotations entirely.

use crate::config::OcrConfig;
use crate::error::OcrError;
use crate::preprocessing::{steps, Pipeline};
use image::{DynamicImage, GrayImage};
use std::rc::Rc;

/// One OCR attempt: a preprocessed image variant plus engine settings
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub image: Rc<GrayImage>,
    pub language: &'a str,
    pub psm: u32,
    /// Counter-clockwise rotation applied to the label
    pub rotation: i32,
    /// Whether the bottom band was trimmed off
    pub trimmed: bool,
}

/// Search space over rotations, languages and page segmentation modes
pub struct CandidateSpace<'a> {
    label: GrayImage,
    config: &'a OcrConfig,
    rotations: Vec<i32>,
    pipeline: Pipeline,
}

impl<'a> CandidateSpace<'a> {
    pub fn new(label: &DynamicImage, config: &'a OcrConfig) -> Self {
        Self {
            label: label.to_luma8(),
            config,
            rotations: config.rotations(),
            pipeline: Pipeline::new(config),
        }
    }

    /// Rotations iterated, after the forced/auto-rotate rules
    pub fn rotations(&self) -> &[i32] {
        &self.rotations
    }

    /// Number of candidates a full pass yields
    pub fn len(&self) -> usize {
        let pairs = self.config.language_candidates.len() * self.config.psm_candidates.len();
        let unrotated = self.rotations.iter().filter(|&&deg| deg == 0).count();
        (self.rotations.len() + unrotated) * pairs
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a new pass over the candidates
    pub fn iter(&self) -> Candidates<'_, 'a> {
        Candidates {
            space: self,
            cursor: Cursor::default(),
            variants: vec![[None, None]; self.rotations.len()],
            done: false,
        }
    }

    /// rotate -> (trim) -> pad -> preprocess
    fn build_variant(&self, rotation: i32, trimmed: bool) -> Result<GrayImage, OcrError> {
        let mut img = DynamicImage::ImageLuma8(self.label.clone());
        img = steps::rotate::apply(img, rotation)?;
        if trimmed {
            img = steps::trim::apply(img, steps::trim::BOTTOM_FRACTION)?;
        }
        img = steps::pad::apply(img, steps::pad::BORDER_PX)?;
        self.pipeline.process(img)
    }
}

impl<'s, 'a> IntoIterator for &'s CandidateSpace<'a> {
    type Item = Result<Candidate<'a>, OcrError>;
    type IntoIter = Candidates<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    lang: usize,
    psm: usize,
    rot: usize,
    trimmed: bool,
}

/// Lazy pass over a [`CandidateSpace`]
///
/// Order: for each language, for each PSM, for each rotation, the padded
/// variant followed (for rotation 0 only) by the trim-bottom variant.
pub struct Candidates<'s, 'a> {
    space: &'s CandidateSpace<'a>,
    cursor: Cursor,
    /// Built images per rotation index, `[full, trimmed]`
    variants: Vec<[Option<Rc<GrayImage>>; 2]>,
    done: bool,
}

impl<'s, 'a> Candidates<'s, 'a> {
    fn step(&mut self) {
        let space = self.space;
        let at = self.cursor;

        if !at.trimmed && space.rotations[at.rot] == 0 {
            self.cursor.trimmed = true;
            return;
        }

        self.cursor.trimmed = false;
        self.cursor.rot += 1;
        if self.cursor.rot == space.rotations.len() {
            self.cursor.rot = 0;
            self.cursor.psm += 1;
            if self.cursor.psm == space.config.psm_candidates.len() {
                self.cursor.psm = 0;
                self.cursor.lang += 1;
            }
        }
    }

    fn variant(&mut self, rot: usize, trimmed: bool) -> Result<Rc<GrayImage>, OcrError> {
        let slot = &mut self.variants[rot][trimmed as usize];
        if let Some(image) = slot {
            return Ok(Rc::clone(image));
        }

        let rotation = self.space.rotations[rot];
        let image = Rc::new(self.space.build_variant(rotation, trimmed)?);
        tracing::trace!(
            "Built variant rotation={} trimmed={} ({}x{})",
            rotation,
            trimmed,
            image.width(),
            image.height()
        );
        *slot = Some(Rc::clone(&image));
        Ok(image)
    }
}

impl<'s, 'a> Iterator for Candidates<'s, 'a> {
    type Item = Result<Candidate<'a>, OcrError>;

    fn next(&mut self) -> Option<Self::Item> {
        let space = self.space;
        let config = space.config;

        if self.done
            || space.rotations.is_empty()
            || config.psm_candidates.is_empty()
            || self.cursor.lang >= config.language_candidates.len()
        {
            self.done = true;
            return None;
        }

        let at = self.cursor;
        self.step();

        match self.variant(at.rot, at.trimmed) {
            Ok(image) => Some(Ok(Candidate {
                image,
                language: config.language_candidates[at.lang].as_str(),
                psm: config.psm_candidates[at.psm],
                rotation: space.rotations[at.rot],
                trimmed: at.trimmed,
            })),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
