//! Moving Average Smoothing

use crate::series::Series;

/// Default box-kernel width in frames
pub const DEFAULT_WINDOW: usize = 50;

/// Centered box-kernel moving average
///
/// Output frame `i` averages the `window` input frames centered on `i` as a
/// same-length convolution does: frames outside the series count as zero, so
/// the edges are attenuated rather than renormalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverage {
    window: usize,
}

impl MovingAverage {
    /// Create a smoother; a window of 0 or 1 leaves the signal unchanged
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Smooth a whole series
    pub fn apply(&self, input: &Series) -> Series {
        if self.window == 1 {
            return input.clone();
        }

        let values = input.as_slice();
        let n = values.len();
        let mut prefix = Vec::with_capacity(n + 1);
        prefix.push(0.0);
        let mut acc = 0.0;
        for &v in values {
            acc += v;
            prefix.push(acc);
        }

        // Output i covers inputs [i + offset + 1 - window, i + offset]
        let offset = (self.window - 1) / 2;
        let scale = self.window as f64;
        (0..n)
            .map(|i| {
                let hi = (i + offset + 1).min(n);
                let lo = (i + offset + 1).saturating_sub(self.window).min(hi);
                (prefix[hi] - prefix[lo]) / scale
            })
            .collect()
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
