//! Running per-channel extremum tracking
//!
//! Maintains the run-wide max/min value per channel and reports, per tick,
//! whether any channel set a new extremum. Keeps the changed-channel sets of
//! the previous tick so the evaluator can detect extrema that did not persist
//! into the following tick.

use log::{debug, trace};

use crate::error::{Result, SamplerError};

/// Tracks per-channel running max/min values across a whole stream.
#[derive(Debug)]
pub struct ExtremumTracker {
    max: Vec<i32>,
    min: Vec<i32>,

    // channel indices that set a new extremum, for the current and the
    // previous update call
    this_max: Vec<usize>,
    last_max: Vec<usize>,
    this_min: Vec<usize>,
    last_min: Vec<usize>,

    this_changed: bool,
    last_autonomous: bool,
}

impl ExtremumTracker {
    /// Create a tracker with sentinel bounds for `channel_count` channels
    pub fn new(channel_count: usize) -> Self {
        Self {
            max: vec![i32::MIN; channel_count],
            min: vec![i32::MAX; channel_count],
            this_max: Vec::new(),
            last_max: Vec::new(),
            this_min: Vec::new(),
            last_min: Vec::new(),
            this_changed: false,
            last_autonomous: false,
        }
    }

    /// Number of tracked channels
    pub fn channel_count(&self) -> usize {
        self.max.len()
    }

    /// Feed one tick. Returns true if any channel set a new max or min.
    ///
    /// Also refreshes the autonomous-extremum flag for the *previous* tick:
    /// it is meaningful only when the previous and the current call both
    /// reported a change.
    pub fn update(&mut self, timestamp_ms: i64, values: &[i32]) -> bool {
        debug_assert_eq!(values.len(), self.max.len());

        let last_changed = self.this_changed;
        self.this_changed = false;
        self.last_autonomous = false;

        if last_changed {
            // the sets of the previous call become the lagged sets
            std::mem::swap(&mut self.last_max, &mut self.this_max);
            std::mem::swap(&mut self.last_min, &mut self.this_min);
            self.this_max.clear();
            self.this_min.clear();
        }

        for (i, &value) in values.iter().enumerate() {
            if value > self.max[i] {
                self.this_max.push(i);
                self.max[i] = value;
                self.this_changed = true;
            } else if value < self.min[i] {
                self.this_min.push(i);
                self.min[i] = value;
                self.this_changed = true;
            }
        }
        trace!(
            "timestamp_ms={} new_extremum={} values={:?}",
            timestamp_ms, self.this_changed, values
        );

        if last_changed && self.this_changed {
            self.last_autonomous = self.check_autonomous(timestamp_ms, values);
        }
        self.this_changed
    }

    /// True if the previous tick set an extremum the current tick fell back
    /// from — a one-tick spike that must not be lost.
    pub fn last_autonomous_extremum(&self) -> bool {
        self.last_autonomous
    }

    /// Compare the current raw values against the bounds the previous tick
    /// set. A value now strictly inside the bound means the extremum was
    /// transient.
    fn check_autonomous(&self, timestamp_ms: i64, values: &[i32]) -> bool {
        let fallen_max = self
            .last_max
            .iter()
            .any(|&i| values[i] < self.max[i]);
        let risen_min = self
            .last_min
            .iter()
            .any(|&i| values[i] > self.min[i]);

        if fallen_max || risen_min {
            debug!(
                "timestamp_ms={} autonomous extremum behind max={:?} min={:?}",
                timestamp_ms, self.last_max, self.last_min
            );
            true
        } else {
            false
        }
    }

    /// Reseed the bounds from a previous run over the same channel layout.
    ///
    /// The stored bounds diverge by one so that a later tick exactly equal to
    /// a previously-known extreme still counts as strictly new. Sentinel
    /// inputs pass through untouched.
    pub fn reseed(&mut self, new_max: &[i32], new_min: &[i32]) -> Result<()> {
        if new_max.len() != self.max.len() {
            return Err(SamplerError::ChannelMismatch {
                expected: self.max.len(),
                actual: new_max.len(),
            });
        }
        if new_min.len() != self.min.len() {
            return Err(SamplerError::ChannelMismatch {
                expected: self.min.len(),
                actual: new_min.len(),
            });
        }

        for (slot, &value) in self.max.iter_mut().zip(new_max) {
            *slot = if value == i32::MIN {
                value
            } else {
                value.saturating_sub(1)
            };
        }
        for (slot, &value) in self.min.iter_mut().zip(new_min) {
            *slot = if value == i32::MAX {
                value
            } else {
                value.saturating_add(1)
            };
        }
        self.reset_lag();
        Ok(())
    }

    /// Reset every channel to the sentinel bounds
    pub fn clear(&mut self) {
        self.max.fill(i32::MIN);
        self.min.fill(i32::MAX);
        self.reset_lag();
    }

    // lagged state must not leak across a reseed boundary
    fn reset_lag(&mut self) {
        self.this_max.clear();
        self.last_max.clear();
        self.this_min.clear();
        self.last_min.clear();
        self.this_changed = false;
        self.last_autonomous = false;
    }

    /// Current per-channel maxima
    pub fn max_values(&self) -> &[i32] {
        &self.max
    }

    /// Current per-channel minima
    pub fn min_values(&self) -> &[i32] {
        &self.min
    }
}
