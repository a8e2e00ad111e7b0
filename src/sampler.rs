//! Downsampler facade
//!
//! Decides at construction time whether sampling is needed at all, owns the
//! extremum tracker / candidate evaluator pair and the random source, and
//! exposes the ingest/retrieve/counter surface the import pipelines drive.

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::SamplerConfig;
use crate::error::{Result, SamplerError};
use crate::evaluator::CandidateEvaluator;
use crate::extremum::ExtremumTracker;
use crate::sample::Sample;

/// Monotonic per-run counters, for observability only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// ticks ingested
    pub reading: u64,
    /// samples released
    pub sampling: u64,
    /// releases beyond one per window
    pub oversampling: u64,
}

#[derive(Debug)]
enum Pipeline {
    /// Sampling disabled: every tick is accepted unconditionally
    PassThrough,
    /// Randomized sampling over fixed windows
    Sampling {
        tracker: ExtremumTracker,
        evaluator: CandidateEvaluator,
        rng: StdRng,
    },
}

/// Randomized extremum-preserving downsampler for one recording run.
///
/// Tries to take not more than one sample per sampling timespan; a premature
/// sample is only taken for an extremum that did not persist into the next
/// tick. Samples become ready one tick late, which loses the last tick of
/// the stream. Sample selection is randomized: multiple runs over the same
/// input select neither the same samples nor the same number of samples.
#[derive(Debug)]
pub struct Downsampler {
    channel_count: usize,
    sampling_timespan_ms: Option<i64>,
    pipeline: Pipeline,
    current: Option<Sample>,
    counters: Counters,
}

impl Downsampler {
    /// Create a sampler with an entropy-seeded random source.
    ///
    /// `recording_timespan_ms` is the tick rate of the recording. Sampling is
    /// enabled only if the effective sampling timespan derived from `config`
    /// is no finer than the recording itself; otherwise every tick passes
    /// through.
    pub fn new(
        channel_count: usize,
        recording_timespan_ms: i64,
        config: &SamplerConfig,
    ) -> Result<Self> {
        Self::with_rng(
            channel_count,
            recording_timespan_ms,
            config,
            StdRng::from_entropy(),
        )
    }

    /// Same as [`Downsampler::new`] but with an injected random source, so
    /// runs can be made deterministic by seeding.
    pub fn with_rng(
        channel_count: usize,
        recording_timespan_ms: i64,
        config: &SamplerConfig,
        rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        if recording_timespan_ms <= 0 {
            return Err(SamplerError::InvalidTimespan {
                timespan_ms: recording_timespan_ms,
            });
        }

        let effective_ms = config.effective_timespan_ms(recording_timespan_ms);
        let (sampling_timespan_ms, pipeline) = if effective_ms >= recording_timespan_ms {
            (
                Some(effective_ms),
                Pipeline::Sampling {
                    tracker: ExtremumTracker::new(channel_count),
                    evaluator: CandidateEvaluator::new(effective_ms),
                    rng,
                },
            )
        } else {
            // sampling timespan must not be smaller than the recording rate
            (None, Pipeline::PassThrough)
        };
        debug!(
            "channel_count={} recording_timespan_ms={} sampling_timespan_ms={:?}",
            channel_count, recording_timespan_ms, sampling_timespan_ms
        );

        Ok(Self {
            channel_count,
            sampling_timespan_ms,
            pipeline,
            current: None,
            counters: Counters::default(),
        })
    }

    /// Feed one tick. Returns true if a sample was released and can be
    /// fetched via [`Downsampler::current_sample`].
    ///
    /// In sampling mode the released sample is the *previous* tick, whose
    /// fate only the current tick could determine.
    #[profiling::function]
    pub fn ingest(&mut self, values: &[i32], timestamp_ms: i64) -> Result<bool> {
        self.check_channels(values.len())?;
        self.counters.reading += 1;

        let released = match &mut self.pipeline {
            Pipeline::PassThrough => {
                self.current = Some(Sample::new(values.to_vec(), timestamp_ms));
                true
            }
            Pipeline::Sampling {
                tracker,
                evaluator,
                rng,
            } => {
                let outcome = evaluator.evaluate(timestamp_ms, values, tracker, rng);
                self.counters.oversampling += outcome.oversampled;
                match outcome.released {
                    Some(sample) => {
                        self.current = Some(sample);
                        true
                    }
                    None => false,
                }
            }
        };
        if released {
            self.counters.sampling += 1;
        }
        Ok(released)
    }

    /// The most recently released sample.
    pub fn current_sample(&self) -> Result<&Sample> {
        self.current.as_ref().ok_or(SamplerError::NoSampleAvailable)
    }

    /// Run counters so far
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Whether randomized sampling is active (false means pass-through)
    pub fn is_sampling(&self) -> bool {
        matches!(self.pipeline, Pipeline::Sampling { .. })
    }

    /// The effective sampling timespan, None in pass-through mode
    pub fn sampling_timespan_ms(&self) -> Option<i64> {
        self.sampling_timespan_ms
    }

    /// Seed the extremum bounds with the min/max values of a previous run
    /// over the same channel layout. Reduces oversampling when a recording
    /// continues across multiple files.
    pub fn reseed_extrema(&mut self, new_max: &[i32], new_min: &[i32]) -> Result<()> {
        self.check_channels(new_max.len())?;
        self.check_channels(new_min.len())?;
        if let Pipeline::Sampling { tracker, .. } = &mut self.pipeline {
            tracker.reseed(new_max, new_min)?;
        }
        Ok(())
    }

    /// Reset the extremum bounds to their sentinels
    pub fn clear_extrema(&mut self) {
        if let Pipeline::Sampling { tracker, .. } = &mut self.pipeline {
            tracker.clear();
        }
    }

    /// Per-channel maxima seen so far, None in pass-through mode
    pub fn max_values(&self) -> Option<&[i32]> {
        match &self.pipeline {
            Pipeline::Sampling { tracker, .. } => Some(tracker.max_values()),
            Pipeline::PassThrough => None,
        }
    }

    /// Per-channel minima seen so far, None in pass-through mode
    pub fn min_values(&self) -> Option<&[i32]> {
        match &self.pipeline {
            Pipeline::Sampling { tracker, .. } => Some(tracker.min_values()),
            Pipeline::PassThrough => None,
        }
    }

    fn check_channels(&self, actual: usize) -> Result<()> {
        if actual != self.channel_count {
            return Err(SamplerError::ChannelMismatch {
                expected: self.channel_count,
                actual,
            });
        }
        Ok(())
    }
}
