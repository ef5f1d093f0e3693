//! Plaque Burden Signal

use pullback_signal::{FrameMask, Series, SignalPair};
use tracing::warn;

/// Plaque fraction of the vessel area at one frame
///
/// Returns NaN when both areas are zero, so that the frame never passes a
/// threshold comparison.
pub fn plaque_burden(lumen: f64, plaque: f64) -> f64 {
    let eem = lumen + plaque;
    if eem == 0.0 {
        f64::NAN
    } else {
        plaque / eem
    }
}

/// Per-frame plaque burden `plaque / (lumen + plaque)`
#[derive(Debug, Clone, PartialEq)]
pub struct BurdenSignal {
    values: Series,
}

impl BurdenSignal {
    /// Compute burden elementwise from lumen and plaque areas
    pub fn compute(lumen: &Series, plaque: &Series) -> Self {
        let values = lumen.zip_with(plaque, plaque_burden);
        let undefined = values.iter().filter(|v| v.is_nan()).count();
        if undefined > 0 {
            warn!("{} frames with zero vessel area have undefined burden", undefined);
        }
        Self { values }
    }

    /// Burden of a validated case
    pub fn from_pair(pair: &SignalPair) -> Self {
        Self::compute(pair.lumen(), pair.plaque())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Burden at `frame`; NaN if undefined or out of range
    pub fn get(&self, frame: usize) -> f64 {
        self.values.get(frame).unwrap_or(f64::NAN)
    }

    pub fn as_series(&self) -> &Series {
        &self.values
    }

    /// Frames whose burden strictly exceeds `threshold`
    pub fn above(&self, threshold: f64) -> FrameMask {
        self.values.mask(|v| v > threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burden_values() {
        let burden = BurdenSignal::compute(
            &Series::new(vec![3.0, 2.0, 0.0]),
            &Series::new(vec![1.0, 2.0, 4.0]),
        );
        assert!((burden.get(0) - 0.25).abs() < 1e-12);
        assert!((burden.get(1) - 0.5).abs() < 1e-12);
        assert!((burden.get(2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_area_is_undefined() {
        let areas = Series::new(vec![0.0, 1.0]);
        let burden = BurdenSignal::compute(&areas, &areas);
        assert!(burden.get(0).is_nan());
        // Undefined frames drop out of every threshold selection
        let mask = burden.above(-1.0);
        assert!(!mask.get(0));
        assert!(mask.get(1));
    }

    #[test]
    fn test_out_of_range_is_undefined() {
        let burden = BurdenSignal::compute(&Series::new(vec![1.0]), &Series::new(vec![1.0]));
        assert!(burden.get(5).is_nan());
    }
}
