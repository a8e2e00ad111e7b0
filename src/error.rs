//! Error types for sample-oxide
//!
//! This module provides structured error handling using thiserror,
//! so callers can distinguish configuration mistakes from misuse of
//! the sampler lifecycle.

use thiserror::Error;

/// Main error type for sampler operations
#[derive(Error, Debug)]
pub enum SamplerError {
    /// Channel count of a supplied vector does not match the configured layout
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// A sample was requested before any ingest call released one
    #[error("no sample available: ingest must release a sample first")]
    NoSampleAvailable,

    /// A timespan that must be positive was zero or negative
    #[error("invalid timespan: {timespan_ms} ms")]
    InvalidTimespan { timespan_ms: i64 },

    /// Config file I/O error
    #[error("failed to access config file: {0}")]
    FileIo(#[from] std::io::Error),

    /// Config (de)serialization error
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for sampler operations
pub type Result<T> = std::result::Result<T, SamplerError>;
