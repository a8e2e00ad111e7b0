//! # sample-oxide
//!
//! Randomized extremum-preserving downsampling for multi-channel telemetry
//! streams.
//!
//! High-frequency recordings (flight recorders, charger logs) easily reach
//! millions of ticks; importing them in full is pointless when the consumer
//! plots or aggregates. This crate reduces such a stream to roughly one
//! sample per configurable timespan while guaranteeing that every per-channel
//! running maximum and minimum survives into the output, at the price of a
//! bounded number of extra ("oversampling") releases.
//!
//! Channel values are opaque signed fixed-point integers (device units
//! × 1000); the sampler never interprets them.
//!
//! ## Quick Start
//!
//! ```rust
//! use sample_oxide::{Downsampler, SamplerConfig};
//!
//! let config = SamplerConfig::default();
//! let mut sampler = Downsampler::new(2, 10, &config).expect("valid config");
//!
//! for (t, values) in [(0, [10, 20]), (10, [11, 19]), (20, [10, 20])] {
//!     if sampler.ingest(&values, t).expect("channel count matches") {
//!         let sample = sampler.current_sample().expect("just released");
//!         println!("kept t={} values={:?}", sample.timestamp_ms(), sample.values());
//!     }
//! }
//! ```
//!
//! Samples are released with a one-tick lag: the fate of a tick is only
//! decided once the following tick shows whether an extremum persisted.
//! Selection within a window is randomized; seed the generator through
//! [`Downsampler::with_rng`] for deterministic runs.

pub mod config;
pub mod constants;
pub mod error;

mod evaluator;
mod extremum;
mod sample;
mod sampler;

pub use config::{SamplerConfig, TransitionClass, TransitionTiming};
pub use error::{Result, SamplerError};
pub use extremum::ExtremumTracker;
pub use sample::Sample;
pub use sampler::{Counters, Downsampler};
