//! Frame Series, Ranges and Masks
//!
//! Per-frame measurements are held in [`Series`]. Sub-windows are addressed
//! with half-open [`FrameRange`]s and threshold selections with [`FrameMask`].

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Half-open frame range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameRange {
    /// First frame in the range
    pub start: usize,
    /// One past the last frame
    pub end: usize,
}

impl FrameRange {
    /// Create a range; an `end` before `start` collapses to an empty range
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range holds no frames
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Intersection with another range, always inside `other`
    ///
    /// Disjoint ranges yield an empty range at the nearest edge of `other`.
    pub fn intersect(&self, other: FrameRange) -> FrameRange {
        let start = self.start.max(other.start).min(other.end);
        let end = self.end.min(other.end).max(start);
        FrameRange::new(start, end)
    }

    /// Iterate over frame indices
    pub fn frames(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Boolean selection over every frame of a series
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameMask {
    bits: Vec<bool>,
}

impl FrameMask {
    /// Number of frames covered (selected or not)
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the mask covers no frames
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Whether `frame` is selected; frames past the end are not
    pub fn get(&self, frame: usize) -> bool {
        self.bits.get(frame).copied().unwrap_or(false)
    }

    /// Frames selected by both masks
    pub fn and(&self, other: &FrameMask) -> FrameMask {
        FrameMask {
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(&a, &b)| a && b)
                .collect(),
        }
    }

    /// Selected frames inside `range`, in increasing order
    pub fn frames_in(&self, range: FrameRange) -> impl Iterator<Item = usize> + '_ {
        range.frames().filter(move |&frame| self.get(frame))
    }

    /// Number of selected frames inside `range`
    pub fn count_in(&self, range: FrameRange) -> usize {
        self.frames_in(range).count()
    }
}

/// Per-frame measurement series, frame 0 at the pullback start
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    values: Vec<f64>,
}

impl Series {
    /// Wrap raw per-frame values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Value at `frame`, if present
    pub fn get(&self, frame: usize) -> Option<f64> {
        self.values.get(frame).copied()
    }

    /// Frames covered by the series as a range
    pub fn extent(&self) -> FrameRange {
        FrameRange::new(0, self.values.len())
    }

    /// Mask of frames whose value satisfies `predicate`
    pub fn mask(&self, predicate: impl Fn(f64) -> bool) -> FrameMask {
        FrameMask {
            bits: self.values.iter().map(|&v| predicate(v)).collect(),
        }
    }

    /// Values inside `range`, optionally restricted to frames selected by `mask`
    pub fn select<'a>(
        &'a self,
        range: FrameRange,
        mask: Option<&'a FrameMask>,
    ) -> impl Iterator<Item = f64> + 'a {
        range
            .intersect(self.extent())
            .frames()
            .filter(move |&frame| mask.map_or(true, |m| m.get(frame)))
            .map(move |frame| self.values[frame])
    }

    /// Elementwise combination with another series (truncated to the shorter)
    pub fn zip_with(&self, other: &Series, f: impl Fn(f64, f64) -> f64) -> Series {
        self.values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| f(a, b))
            .collect()
    }

    /// First frame holding the minimum value inside `range`; NaN never wins
    pub fn argmin_in(&self, range: FrameRange) -> Option<usize> {
        range
            .intersect(self.extent())
            .frames()
            .filter(|&frame| !self.values[frame].is_nan())
            .fold(None, |best: Option<usize>, frame| match best {
                Some(b) if self.values[b] <= self.values[frame] => Some(b),
                _ => Some(frame),
            })
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Series::new(values)
    }
}

impl FromIterator<f64> for Series {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Series::new(iter.into_iter().collect())
    }
}
