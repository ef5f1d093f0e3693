//! Batch configuration

use crate::error::BatchError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stenosis_features::LesionParams;

/// Prefix of environment overrides, e.g. `STENOSIS_GAP=250`
pub const ENV_PREFIX: &str = "STENOSIS";

/// Batch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Moving-average window applied to both area signals (frames)
    pub smoothing_window: usize,

    /// Largest run of unselected frames bridged inside one lesion
    pub gap: usize,

    /// Lesions must be strictly longer than this (frames)
    pub min_lesion_frames: usize,

    /// Worker threads, 0 for the rayon default
    pub threads: usize,

    /// Log level: trace, debug, info, warn or error
    pub log_level: String,

    /// Emit JSON log lines
    pub log_json: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let lesion = LesionParams::default();
        Self {
            smoothing_window: pullback_signal::smoothing::DEFAULT_WINDOW,
            gap: lesion.gap,
            min_lesion_frames: lesion.min_length,
            threads: 0,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl BatchConfig {
    /// Layer defaults, an optional config file and `STENOSIS_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, BatchError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Segmentation parameters of the lesion features
    ///
    /// Burden thresholds are fixed per feature by the catalog.
    pub fn lesion_params(&self) -> LesionParams {
        LesionParams {
            gap: self.gap,
            min_length: self.min_lesion_frames,
            ..LesionParams::default()
        }
    }
}
