//! Signal Error Types

use thiserror::Error;

/// The range invariant a case failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeViolation {
    /// ROI landmarks out of order
    #[error("distal landmark {distal} is not before OS landmark {os}")]
    DistalNotBeforeOs { distal: usize, os: usize },

    /// OS landmark past the end of the pullback
    #[error("OS landmark {os} is beyond the pullback length {frames}")]
    OsBeyondEnd { os: usize, frames: usize },

    /// Lumen and plaque series of different length
    #[error("lumen has {lumen} frames but plaque has {plaque}")]
    LengthMismatch { lumen: usize, plaque: usize },
}

/// Errors while building a per-case signal
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// Malformed landmarks or series lengths
    #[error("Invalid range: {0}")]
    InvalidRange(#[from] RangeViolation),

    /// Negative, non-finite or oversized area sample
    #[error("{channel} area at frame {frame} is {value}, expected a value in [0, 1e9]")]
    InvalidArea {
        channel: &'static str,
        frame: usize,
        value: f64,
    },
}

impl SignalError {
    /// Whether this is an `InvalidRange` failure
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, SignalError::InvalidRange(_))
    }
}
