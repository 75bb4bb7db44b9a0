//! Error types for the unifex document model.

use thiserror::Error;

use crate::coordinates::CoordinateUnit;

/// Primary error type for geometry, conversion, search and extraction.
#[derive(Error, Debug)]
pub enum UnifexError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),

    #[error("DPI is required to convert {unit} coordinates")]
    MissingDpi { unit: CoordinateUnit },

    #[error("invalid DPI: {0} (must be finite and positive)")]
    InvalidDpi(f64),

    #[error("page dimensions are required for normalized coordinates")]
    MissingPageSize,

    #[error("page {page} does not declare its coordinate system")]
    MissingCoordinateInfo { page: usize },

    #[error("invalid coordinate info: {0}")]
    InvalidCoordinateInfo(String),

    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// Convenience Result type alias for UnifexError.
pub type Result<T> = std::result::Result<T, UnifexError>;
