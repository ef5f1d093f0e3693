//! Per-Case Signal Pair and Region of Interest

use crate::error::{RangeViolation, SignalError};
use crate::series::{FrameRange, Series};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest accepted area sample; keeps every sum and variance finite
pub const MAX_AREA: f64 = 1.0e9;

/// Region of interest between the `distal` and `OS` landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    distal: usize,
    os: usize,
}

impl Roi {
    /// Validate landmarks against a pullback of `frames` frames
    pub fn new(distal: usize, os: usize, frames: usize) -> Result<Self, SignalError> {
        if distal >= os {
            return Err(RangeViolation::DistalNotBeforeOs { distal, os }.into());
        }
        if os > frames {
            return Err(RangeViolation::OsBeyondEnd { os, frames }.into());
        }
        Ok(Self { distal, os })
    }

    pub fn distal(&self) -> usize {
        self.distal
    }

    pub fn os(&self) -> usize {
        self.os
    }

    /// ROI frames `[distal, os)`
    pub fn frames(&self) -> FrameRange {
        FrameRange::new(self.distal, self.os)
    }

}

/// Immutable lumen/plaque area signals of one pullback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalPair {
    lumen: Series,
    plaque: Series,
    #[serde(skip)]
    eem: Series,
    roi: Roi,
}

impl SignalPair {
    /// Build a validated signal pair
    ///
    /// Fails with `InvalidRange` when the series lengths differ or the
    /// landmarks do not satisfy `distal < os <= N`, and with `InvalidArea` on
    /// a sample that is not a finite value in `[0, MAX_AREA]`.
    pub fn new(
        lumen: impl Into<Series>,
        plaque: impl Into<Series>,
        distal: usize,
        os: usize,
    ) -> Result<Self, SignalError> {
        let lumen = lumen.into();
        let plaque = plaque.into();

        if lumen.len() != plaque.len() {
            return Err(RangeViolation::LengthMismatch {
                lumen: lumen.len(),
                plaque: plaque.len(),
            }
            .into());
        }
        let roi = Roi::new(distal, os, lumen.len())?;

        validate_areas("lumen", &lumen)?;
        validate_areas("plaque", &plaque)?;
        let eem = lumen.zip_with(&plaque, |l, p| l + p);

        debug!(
            "Signal pair: {} frames, ROI [{}, {})",
            lumen.len(),
            distal,
            os
        );

        Ok(Self {
            lumen,
            plaque,
            eem,
            roi,
        })
    }

    pub fn lumen(&self) -> &Series {
        &self.lumen
    }

    pub fn plaque(&self) -> &Series {
        &self.plaque
    }

    pub fn roi(&self) -> Roi {
        self.roi
    }

    pub fn distal(&self) -> usize {
        self.roi.distal
    }

    pub fn os(&self) -> usize {
        self.roi.os
    }

    /// Number of frames in the pullback
    pub fn len(&self) -> usize {
        self.lumen.len()
    }

    /// Always false: a valid pair holds at least one ROI frame
    pub fn is_empty(&self) -> bool {
        self.lumen.is_empty()
    }

    /// External elastic membrane area `lumen + plaque` per frame
    pub fn eem(&self) -> &Series {
        &self.eem
    }
}

fn validate_areas(channel: &'static str, series: &Series) -> Result<(), SignalError> {
    match series
        .iter()
        .enumerate()
        .find(|(_, v)| !(0.0..=MAX_AREA).contains(v))
    {
        Some((frame, value)) => Err(SignalError::InvalidArea {
            channel,
            frame,
            value,
        }),
        None => Ok(()),
    }
}
