//! Sampler configuration
//!
//! Holds the user-facing sampling timespan plus the per-channel transition
//! timing constraints that may force a finer timespan, and the JSON
//! persistence used to share a configuration between import runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::sampling::DEFAULT_SAMPLING_TIMESPAN_MS;
use crate::error::{Result, SamplerError};

/// Classification of a configured signal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionClass {
    /// Short excursion that returns to the base level
    Peak,
    /// Level change that is held for some time before reverting
    Pulse,
    /// Permanent level change
    Slope,
}

/// Timing constraints of one configured transition
///
/// The sampler only uses these at construction time, to make sure the
/// shortest feature of interest still receives at least two samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionTiming {
    pub class: TransitionClass,
    /// Duration of the pre-transition reference level
    pub reference_time_ms: i64,
    /// Duration the signal must hold beyond the threshold
    pub threshold_time_ms: i64,
    /// Minimum peak duration; only meaningful for [`TransitionClass::Peak`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_minimum_time_ms: Option<i64>,
}

/// Sampler configuration, persisted as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Requested sampling timespan; the effective value may be smaller
    pub sampling_timespan_ms: i64,
    /// Transition timing constraints of the active channel
    #[serde(default)]
    pub transitions: Vec<TransitionTiming>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sampling_timespan_ms: DEFAULT_SAMPLING_TIMESPAN_MS,
            transitions: Vec::new(),
        }
    }
}

impl SamplerConfig {
    /// Compute the sampling timespan actually used for a run.
    ///
    /// Each transition halves the shortest feature it describes so that the
    /// feature contains at least two samples. Peaks without an explicit
    /// minimum duration fall back to twice the recording timespan. The
    /// recovery time is deliberately ignored, it may be 0 for slopes.
    pub fn effective_timespan_ms(&self, recording_timespan_ms: i64) -> i64 {
        let mut proposed = self.sampling_timespan_ms;
        for transition in &self.transitions {
            if transition.class == TransitionClass::Peak {
                let peak_limit = match transition.peak_minimum_time_ms {
                    Some(peak_min) => peak_min / 2,
                    None => recording_timespan_ms * 2,
                };
                proposed = proposed.min(peak_limit);
            }
            let detectable =
                transition.reference_time_ms.min(transition.threshold_time_ms) / 2;
            proposed = proposed.min(detectable);
        }
        proposed
    }

    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject non-positive timespans before a run is constructed
    pub fn validate(&self) -> Result<()> {
        if self.sampling_timespan_ms <= 0 {
            return Err(SamplerError::InvalidTimespan {
                timespan_ms: self.sampling_timespan_ms,
            });
        }
        Ok(())
    }
}
