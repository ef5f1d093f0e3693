//! Batch Error Types

use pullback_signal::SignalError;
use thiserror::Error;

/// Errors raised while loading, evaluating or writing a batch
#[derive(Debug, Error)]
pub enum BatchError {
    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Case file is not valid JSON
    #[error("Invalid case file: {0}")]
    Json(#[from] serde_json::Error),

    /// Feature table could not be written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration layering or deserialization failed
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Unknown log level in configuration
    #[error("Invalid log level: {0}")]
    LogLevel(String),

    /// Areas in pixels with no known calibration
    #[error("Case {case}: unsupported image matrix size {size}")]
    UnsupportedMatrix { case: String, size: u32 },

    /// Case signals failed validation
    #[error("Case {case}: {source}")]
    Signal {
        case: String,
        #[source]
        source: SignalError,
    },

    /// Worker pool could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A global subscriber was already installed
    #[error("Logging already initialized: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),
}

impl BatchError {
    /// Whether the error concerns a single case rather than the whole batch
    pub fn is_case_error(&self) -> bool {
        matches!(self, BatchError::UnsupportedMatrix { .. } | BatchError::Signal { .. })
    }
}
