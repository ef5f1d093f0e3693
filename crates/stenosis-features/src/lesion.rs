//! Lesion Segmentation
//!
//! A lesion is a stretch of the ROI where plaque burden exceeds a threshold.
//! Short dips below the threshold are bridged when fewer than `gap` frames
//! separate two crossings, and stretches no longer than `min_length` frames
//! are discarded.

use crate::burden::BurdenSignal;
use crate::FIVE_MM_FRAMES;
use pullback_signal::{Roi, SignalError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Segmentation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LesionParams {
    /// Burden a frame must exceed to belong to a lesion
    pub burden_threshold: f64,
    /// Runs separated by fewer unselected frames than this are merged
    pub gap: usize,
    /// A lesion must satisfy `end - start > min_length`
    pub min_length: usize,
}

impl Default for LesionParams {
    fn default() -> Self {
        Self {
            burden_threshold: 0.4,
            gap: FIVE_MM_FRAMES,
            min_length: FIVE_MM_FRAMES,
        }
    }
}

impl LesionParams {
    /// Same parameters with another burden threshold
    pub fn with_threshold(self, burden_threshold: f64) -> Self {
        Self {
            burden_threshold,
            ..self
        }
    }
}

/// Closed frame interval `[start, end]` of one lesion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LesionInterval {
    pub start: usize,
    pub end: usize,
}

impl LesionInterval {
    fn at(frame: usize) -> Self {
        Self {
            start: frame,
            end: frame,
        }
    }

    /// `end - start`, the quantity compared against the minimum length
    pub fn length(&self) -> usize {
        self.end - self.start
    }
}

/// Result of segmentation: lesions ordered by start, or none at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LesionSet {
    /// No interval survived selection and filtering
    NoLesion,
    /// One or more intervals, sorted and non-overlapping
    Lesions(Vec<LesionInterval>),
}

impl LesionSet {
    /// Wrap intervals, mapping an empty list to `NoLesion`
    pub fn from_intervals(intervals: Vec<LesionInterval>) -> Self {
        if intervals.is_empty() {
            LesionSet::NoLesion
        } else {
            LesionSet::Lesions(intervals)
        }
    }

    pub fn is_no_lesion(&self) -> bool {
        matches!(self, LesionSet::NoLesion)
    }

    pub fn intervals(&self) -> &[LesionInterval] {
        match self {
            LesionSet::NoLesion => &[],
            LesionSet::Lesions(intervals) => intervals,
        }
    }

    /// Lesion nearest the distal landmark
    pub fn first(&self) -> Option<&LesionInterval> {
        self.intervals().first()
    }

    /// Lesion nearest the OS landmark
    pub fn last(&self) -> Option<&LesionInterval> {
        self.intervals().last()
    }

    pub fn len(&self) -> usize {
        self.intervals().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals().is_empty()
    }

    /// Sum of `end - start` over all lesions
    pub fn total_length(&self) -> usize {
        self.intervals().iter().map(LesionInterval::length).sum()
    }
}

/// Threshold-and-merge lesion segmenter
#[derive(Debug, Clone, Copy, Default)]
pub struct LesionSegmenter {
    params: LesionParams,
}

impl LesionSegmenter {
    pub fn new(params: LesionParams) -> Self {
        Self { params }
    }

    /// Segment the burden signal inside `[distal, os]`
    ///
    /// Fails with `InvalidRange` unless `distal < os <= burden.len()`.
    pub fn segment(
        &self,
        burden: &BurdenSignal,
        distal: usize,
        os: usize,
    ) -> Result<LesionSet, SignalError> {
        let roi = Roi::new(distal, os, burden.len())?;
        Ok(self.segment_roi(burden, roi))
    }

    /// Segment inside an already validated ROI
    pub fn segment_roi(&self, burden: &BurdenSignal, roi: Roi) -> LesionSet {
        let candidates = self.candidate_runs(burden, roi);
        let candidate_count = candidates.len();
        let lesions: Vec<LesionInterval> = candidates
            .into_iter()
            .filter(|run| run.length() > self.params.min_length)
            .collect();

        debug!(
            "Segmentation at burden > {}: {} runs, {} lesions",
            self.params.burden_threshold,
            candidate_count,
            lesions.len()
        );

        LesionSet::from_intervals(lesions)
    }

    /// Merged runs of above-threshold frames, before length filtering
    ///
    /// Frames are taken from `[distal, os]` inclusive. Every run is seeded at
    /// the first selected frame the previous run did not absorb; a selected
    /// frame extends the current run when it is adjacent to the run's last
    /// frame or when fewer than `gap` unselected frames lie between them.
    pub fn candidate_runs(&self, burden: &BurdenSignal, roi: Roi) -> Vec<LesionInterval> {
        let last_frame = (roi.os() + 1).min(burden.len());
        let selected = (roi.distal()..last_frame)
            .filter(|&frame| burden.get(frame) > self.params.burden_threshold);

        let mut runs = Vec::new();
        let mut current: Option<LesionInterval> = None;
        for frame in selected {
            current = match current {
                Some(mut run) => {
                    let skipped = frame - run.end - 1;
                    if skipped == 0 || skipped < self.params.gap {
                        run.end = frame;
                    } else {
                        runs.push(run);
                        run = LesionInterval::at(frame);
                    }
                    Some(run)
                }
                None => Some(LesionInterval::at(frame)),
            };
        }
        runs.extend(current);
        runs
    }
}
