//! Case Input
//!
//! Cases arrive as a JSON array of records holding per-frame lumen and
//! plaque areas and the distal/OS landmarks. Areas recorded in pixels carry
//! the image matrix size they were measured on.

use crate::error::BatchError;
use pullback_signal::{MovingAverage, SignalPair};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// One pullback as stored in the case file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case identifier, first column of the output
    pub id: String,
    /// Lumen area per frame
    pub lumen: Vec<f64>,
    /// Plaque area per frame
    pub plaque: Vec<f64>,
    /// Distal landmark frame
    pub distal: usize,
    /// Ostium landmark frame
    #[serde(alias = "OS")]
    pub os: usize,
    /// Image matrix size when areas are pixel counts; absent for mm²
    #[serde(default)]
    pub matrix_size: Option<u32>,
}

/// Pixels per mm² for a square image matrix of `size` pixels
pub fn pixel_scale(size: u32) -> Option<f64> {
    match size {
        480 => Some(50.0_f64.powi(2) * (256.0_f64 / 480.0).powi(2)),
        512 => Some(56.5_f64.powi(2) * (256.0_f64 / 512.0).powi(2)),
        _ => None,
    }
}

impl CaseRecord {
    /// Areas in mm² for both channels
    fn calibrated(&self) -> Result<(Vec<f64>, Vec<f64>), BatchError> {
        let Some(size) = self.matrix_size else {
            return Ok((self.lumen.clone(), self.plaque.clone()));
        };
        let scale = pixel_scale(size).ok_or_else(|| BatchError::UnsupportedMatrix {
            case: self.id.clone(),
            size,
        })?;
        let to_mm2 = |areas: &[f64]| areas.iter().map(|a| a / scale).collect::<Vec<f64>>();
        Ok((to_mm2(&self.lumen), to_mm2(&self.plaque)))
    }

    /// Calibrate, validate and smooth the case signals
    pub fn to_signal_pair(&self, smoother: &MovingAverage) -> Result<SignalPair, BatchError> {
        let signal_error = |source| BatchError::Signal {
            case: self.id.clone(),
            source,
        };

        let (lumen, plaque) = self.calibrated()?;
        let raw = SignalPair::new(lumen, plaque, self.distal, self.os).map_err(signal_error)?;
        let smoothed = SignalPair::new(
            smoother.apply(raw.lumen()),
            smoother.apply(raw.plaque()),
            self.distal,
            self.os,
        )
        .map_err(signal_error)?;

        debug!(
            "Case {}: {} frames, smoothing window {}",
            self.id,
            smoothed.len(),
            smoother.window()
        );
        Ok(smoothed)
    }
}

/// Parse a JSON array of case records
pub fn parse_cases(json: &str) -> Result<Vec<CaseRecord>, BatchError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a case file
pub fn load_cases(path: &Path) -> Result<Vec<CaseRecord>, BatchError> {
    let json = fs::read_to_string(path)?;
    let cases = parse_cases(&json)?;
    info!("Loaded {} cases from {}", cases.len(), path.display());
    Ok(cases)
}
