//! Stenosis Batch Driver
//!
//! Loads pullback cases, evaluates the standard feature catalog for each of
//! them in parallel and writes one CSV row per valid case.

use rayon::prelude::*;
use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod config;
mod error;
mod input;
mod output;

pub use crate::config::{BatchConfig, ENV_PREFIX};
pub use error::BatchError;
pub use input::{load_cases, parse_cases, pixel_scale, CaseRecord};
pub use output::{FeatureRow, FeatureTable};

use pullback_signal::MovingAverage;
use stenosis_features::FeatureCatalog;

/// Initialize the global tracing subscriber
pub fn init_logging(level: &str, json: bool) -> Result<(), BatchError> {
    let level = Level::from_str(level).map_err(|_| BatchError::LogLevel(level.to_string()))?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Case that could not be evaluated
#[derive(Debug)]
pub struct RejectedCase {
    pub case_id: String,
    pub error: BatchError,
}

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Feature rows of the valid cases, in input order
    pub rows: Vec<FeatureRow>,
    /// Cases skipped because of invalid data
    pub rejected: Vec<RejectedCase>,
}

/// Evaluates the feature catalog over a batch of cases
pub struct BatchRunner {
    catalog: FeatureCatalog,
    smoother: MovingAverage,
    threads: usize,
}

impl BatchRunner {
    /// Create a runner from configuration
    pub fn new(config: &BatchConfig) -> Self {
        let catalog = FeatureCatalog::standard(config.lesion_params());
        info!(
            "Batch runner: {} features, smoothing window {}, gap {}",
            catalog.len(),
            config.smoothing_window,
            config.gap
        );
        Self {
            catalog,
            smoother: MovingAverage::new(config.smoothing_window),
            threads: config.threads,
        }
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    /// Evaluate one case
    pub fn evaluate(&self, case: &CaseRecord) -> Result<FeatureRow, BatchError> {
        let pair = case.to_signal_pair(&self.smoother)?;
        Ok(FeatureRow {
            case_id: case.id.clone(),
            values: self.catalog.evaluate_all(&pair),
        })
    }

    /// Evaluate every case, on a dedicated pool when `threads` is set
    pub fn run(&self, cases: &[CaseRecord]) -> Result<BatchReport, BatchError> {
        let results = if self.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()?;
            pool.install(|| self.evaluate_parallel(cases))
        } else {
            self.evaluate_parallel(cases)
        };

        let mut report = BatchReport::default();
        for (case, result) in cases.iter().zip(results) {
            match result {
                Ok(row) => report.rows.push(row),
                Err(error) => {
                    warn!("Skipping case {}: {}", case.id, error);
                    report.rejected.push(RejectedCase {
                        case_id: case.id.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "Evaluated {} cases, rejected {}",
            report.rows.len(),
            report.rejected.len()
        );
        Ok(report)
    }

    fn evaluate_parallel(&self, cases: &[CaseRecord]) -> Vec<Result<FeatureRow, BatchError>> {
        cases.par_iter().map(|case| self.evaluate(case)).collect()
    }
}
