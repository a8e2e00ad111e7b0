//! Crate-wide constants and default values
//!
//! This module centralizes all magic numbers and default values used throughout
//! the sampler, making them easier to maintain and configure.

/// Sampling defaults
pub mod sampling {
    /// Default sampling timespan: one sample per 10 s plus oversampling
    pub const DEFAULT_SAMPLING_TIMESPAN_MS: i64 = 10_000;

    /// Scale factor of the fixed-point channel values (device units × 1000)
    pub const VALUE_SCALE: i32 = 1000;
}

/// Configuration file paths
pub mod config {
    /// Configuration file name
    pub const CONFIG_FILE: &str = "sample-oxide.json";
}
