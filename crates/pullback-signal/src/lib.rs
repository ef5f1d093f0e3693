//! Pullback Signals
//!
//! Validated per-case lumen and plaque area series, frame ranges and masks,
//! and the moving-average smoothing applied before feature extraction.

mod error;
mod series;
mod signal;
pub mod smoothing;

pub use error::{RangeViolation, SignalError};
pub use series::{FrameMask, FrameRange, Series};
pub use signal::{Roi, SignalPair, MAX_AREA};
pub use smoothing::MovingAverage;
