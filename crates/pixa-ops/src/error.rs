//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    /// Zero requested width/height, both resize dimensions zero, or an empty source.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Invalid parameter value (sigma, amount, radius, filter name).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Filter weights summed to zero during normalization.
    #[error("degenerate filter: {0}")]
    DegenerateFilter(String),

    /// Worker pool could not be created.
    #[error("thread pool: {0}")]
    ThreadPool(String),

    /// Pixel buffer error.
    #[error(transparent)]
    Core(#[from] pixa_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
