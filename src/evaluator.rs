//! Per-window candidate evaluation
//!
//! One `Candidate` is built for every ingested tick; the fate of a candidate
//! is decided only once the *next* tick has been evaluated, because detecting
//! a transient extremum requires seeing what happens after it. The decision
//! itself is a pure function over the two consecutive candidates.

use log::{debug, trace};
use rand::Rng;
use rand::rngs::StdRng;

use crate::extremum::ExtremumTracker;
use crate::sample::Sample;

/// Fate of the previous tick, determined by the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Release,
    Discard,
}

/// Bookkeeping state of one evaluated tick
#[derive(Debug)]
pub(crate) struct Candidate {
    timestamp_ms: i64,
    /// start of the sampling window owning this tick
    window_start_ms: i64,
    /// randomly drawn instant inside the window
    target_ms: i64,
    /// an earlier tick of this window already claimed the target
    target_taken: bool,
    is_target: bool,
    is_extremum: bool,
    /// releases recorded for this tick's window so far
    samples_this_window: u32,
    /// captured values; None when this tick can never be promoted
    payload: Option<Vec<i32>>,
}

/// What one evaluated tick produced
#[derive(Debug, Default)]
pub(crate) struct TickOutcome {
    /// the previous tick, if it was released
    pub released: Option<Sample>,
    /// oversampling recorded for a window that just closed
    pub oversampled: u64,
}

/// Decide the fate of `prev` given the freshly evaluated `curr`.
///
/// A tick that is both a window's target and an extremum is always kept. A
/// non-target extremum is kept only as the sole surviving evidence of a spike
/// (`autonomous`) or when nothing after it re-establishes the extremum. A
/// plain target is kept unless the window quota of one release is already
/// met.
pub(crate) fn decide(prev: &Candidate, curr: &Candidate, autonomous: bool) -> Decision {
    let release = match (prev.is_extremum, prev.is_target) {
        (true, true) => match (curr.is_extremum, curr.is_target) {
            (true, true) => true,
            (true, false) => autonomous,
            (false, _) => true,
        },
        (true, false) => match (curr.is_extremum, curr.is_target) {
            (true, true) => false,
            (true, false) => autonomous,
            // oversampling compensation: nothing after it carries the extremum
            (false, _) => true,
        },
        (false, true) => match (curr.is_extremum, curr.is_target) {
            (true, false) => false,
            // release only while the window is still without a sample
            _ => prev.samples_this_window == 0,
        },
        (false, false) => false,
    };
    if release {
        Decision::Release
    } else {
        Decision::Discard
    }
}

/// Two-slot evaluation pipeline over contiguous sampling windows.
///
/// Windows tile the timeline from origin 0 in fixed `timespan_ms` steps. The
/// boundary advances one step per roll — never jumping to a late timestamp —
/// so tiling stays uniform across recording gaps.
#[derive(Debug)]
pub(crate) struct CandidateEvaluator {
    timespan_ms: i64,
    prev: Option<Candidate>,
}

impl CandidateEvaluator {
    pub fn new(timespan_ms: i64) -> Self {
        debug_assert!(timespan_ms > 0);
        Self {
            timespan_ms,
            prev: None,
        }
    }

    /// Evaluate one tick and decide the fate of the previous one.
    pub fn evaluate(
        &mut self,
        timestamp_ms: i64,
        values: &[i32],
        tracker: &mut ExtremumTracker,
        rng: &mut StdRng,
    ) -> TickOutcome {
        let mut oversampled = 0u64;

        let (window_start_ms, target_ms, target_taken, samples_this_window) =
            match self.prev.as_mut() {
                Some(prev) if timestamp_ms < prev.window_start_ms + self.timespan_ms => (
                    prev.window_start_ms,
                    prev.target_ms,
                    prev.target_taken || prev.is_target,
                    prev.samples_this_window,
                ),
                prev => {
                    // window roll: advance by exactly one timespan
                    let window_start_ms = match &prev {
                        Some(p) => p.window_start_ms + self.timespan_ms,
                        None => 0,
                    };
                    if let Some(prev) = prev {
                        oversampled = u64::from(prev.samples_this_window.saturating_sub(1));
                        if prev.samples_this_window == 0 {
                            // the closed window never released; promote the
                            // previous tick so every window yields a sample
                            prev.is_target = true;
                            debug!(
                                "timestamp_ms={} empty window, promoting tick at {}",
                                timestamp_ms, prev.timestamp_ms
                            );
                        }
                    }
                    let target_ms = window_start_ms + rng.gen_range(0..self.timespan_ms);
                    trace!(
                        "timestamp_ms={} new window [{}, {}) target_ms={}",
                        timestamp_ms,
                        window_start_ms,
                        window_start_ms + self.timespan_ms,
                        target_ms
                    );
                    (window_start_ms, target_ms, false, 0)
                }
            };

        let is_target = !target_taken && timestamp_ms >= target_ms;
        let is_extremum = tracker.update(timestamp_ms, values);

        // copying makes the candidate immutable in terms of the value set;
        // ticks that can never be promoted skip the copy
        let payload = if is_extremum || samples_this_window == 0 {
            Some(values.to_vec())
        } else {
            None
        };

        let mut curr = Candidate {
            timestamp_ms,
            window_start_ms,
            target_ms,
            target_taken,
            is_target,
            is_extremum,
            samples_this_window,
            payload,
        };

        let mut released = None;
        if let Some(prev) = self.prev.as_mut() {
            let autonomous = tracker.last_autonomous_extremum();
            let decision = decide(prev, &curr, autonomous);
            trace!(
                "decision={:?} prev_ms={} prev_extremum={} prev_target={} curr_extremum={} curr_target={} autonomous={}",
                decision,
                prev.timestamp_ms,
                prev.is_extremum,
                prev.is_target,
                curr.is_extremum,
                curr.is_target,
                autonomous
            );
            if decision == Decision::Release {
                debug_assert!(prev.payload.is_some(), "released candidate without payload");
                if let Some(payload) = prev.payload.take() {
                    released = Some(Sample::new(payload, prev.timestamp_ms));
                    if prev.window_start_ms < curr.window_start_ms {
                        // the released tick belongs to the window that closed
                        prev.samples_this_window += 1;
                    } else {
                        curr.samples_this_window += 1;
                    }
                }
            }
        }
        self.prev = Some(curr);

        TickOutcome {
            released,
            oversampled,
        }
    }
}
