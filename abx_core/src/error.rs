//! Error types for the abx_core library.
//!
//! The decision path itself never fails: missing data and unmatched rules are
//! represented in the output. These errors only cover the I/O and validation
//! boundary around the engine.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for abx_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Patient profile rejected at the boundary
    #[error("Invalid patient profile: {0}")]
    InvalidProfile(String),

    /// Reference table loading or validation error
    #[error("Reference data error: {0}")]
    ReferenceData(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
