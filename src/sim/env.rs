//! Episodic microgrid environment: reset/step over a shared exogenous series.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::devices::Battery;
use crate::error::EnvError;
use crate::sim::power_balance::grid_net;
use crate::sim::reward::RewardWeights;
use crate::sim::series::{Record, TimeSeries};
use crate::sim::types::{ActionSpace, Observation, ObservationSpace, ResetInfo, Step, StepInfo};

/// Construction-time options of a [`GridEnv`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvOptions {
    pub weights: RewardWeights,
    /// Steps guaranteed to remain after a random episode start.
    pub min_episode_steps: usize,
    /// Seed of the environment's own start-index generator.
    pub seed: u64,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            weights: RewardWeights::default(),
            min_episode_steps: 24 * 4 * 7,
            seed: 42,
        }
    }
}

/// Battery-in-the-loop microgrid environment.
///
/// Owns one [`Battery`], a cursor into a shared [`TimeSeries`] and its own
/// random generator for episode starts. One instance must be driven by one
/// caller; independent instances may share the same series.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use microgrid_env::devices::Battery;
/// use microgrid_env::sim::env::{EnvOptions, GridEnv};
/// use microgrid_env::sim::series::{Record, TimeSeries};
///
/// let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let records = (0..800)
///     .map(|i| Record {
///         timestamp: start + chrono::Duration::minutes(15 * i),
///         load: 500.0,
///         solar: 0.0,
///         wind_onshore: 100.0,
///         wind_offshore: 0.0,
///     })
///     .collect();
/// let series = TimeSeries::from_records(records).unwrap();
/// let battery = Battery::new(1000.0, 250.0, 0.95, 0.5, 0.25);
/// let mut env = GridEnv::new(series, battery, EnvOptions::default()).unwrap();
///
/// let (obs, _info) = env.reset(Some(7));
/// assert_eq!(obs.soc, 0.5);
///
/// let step = env.step(0.0);
/// assert_eq!(step.info.net_grid_exchange, 400.0);
/// assert!(!step.terminated);
/// ```
#[derive(Debug, Clone)]
pub struct GridEnv {
    series: TimeSeries,
    battery: Battery,
    weights: RewardWeights,
    min_episode_steps: usize,
    cursor: usize,
    rng: StdRng,
}

impl GridEnv {
    /// Creates an environment positioned at the first row.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::SeriesTooShort` unless the series is longer than
    /// `min_episode_steps`, so that every random start leaves a full episode.
    pub fn new(series: TimeSeries, battery: Battery, options: EnvOptions) -> Result<Self, EnvError> {
        if options.min_episode_steps == 0 {
            return Err(EnvError::Config(
                "min_episode_steps must be > 0".to_string(),
            ));
        }
        if series.len() <= options.min_episode_steps {
            return Err(EnvError::SeriesTooShort {
                len: series.len(),
                required: options.min_episode_steps,
            });
        }

        Ok(Self {
            series,
            battery,
            weights: options.weights,
            min_episode_steps: options.min_episode_steps,
            cursor: 0,
            rng: StdRng::seed_from_u64(options.seed),
        })
    }

    /// Starts a new episode at a uniformly random row in
    /// `[0, len - min_episode_steps)` and resets the battery.
    ///
    /// Passing a seed reseeds the environment's generator first, so the same
    /// seed always yields the same start. Without one, the generator continues
    /// from its current state.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, ResetInfo) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        let window = self.series.len() - self.min_episode_steps;
        self.cursor = self.rng.random_range(0..window);
        self.battery.reset();

        debug!(start = self.cursor, ?seed, "episode reset");
        (self.observe(), ResetInfo::default())
    }

    /// Starts a new episode at an explicit row.
    ///
    /// # Errors
    ///
    /// Returns `EnvError::StartOutOfRange` if `start` is not a valid row.
    pub fn reset_at(&mut self, start: usize) -> Result<(Observation, ResetInfo), EnvError> {
        if start >= self.series.len() {
            return Err(EnvError::StartOutOfRange {
                start,
                len: self.series.len(),
            });
        }
        self.cursor = start;
        self.battery.reset();

        debug!(start, "episode reset at fixed start");
        Ok((self.observe(), ResetInfo::default()))
    }

    /// Applies `action` (a fraction of the battery's rated power, nominally in
    /// `[-1, 1]`) for the current row and advances one row.
    ///
    /// The reward and `info` describe the row the action was issued for; the
    /// returned observation describes the next row. Stepping once the last row
    /// is reached keeps the cursor there and reports `truncated` again.
    pub fn step(&mut self, action: f32) -> Step {
        let commanded = action * self.battery.max_rate();
        let battery_power = self.battery.step(commanded);

        let row = self.row();
        let net_grid_exchange = grid_net(row.load, row.solar, row.wind_total(), battery_power);
        let reward = self.weights.reward(net_grid_exchange, battery_power);

        let last = self.series.len() - 1;
        if self.cursor < last {
            self.cursor += 1;
        } else {
            warn!(cursor = self.cursor, "step past end of series, call reset");
        }
        let truncated = self.cursor >= last;

        trace!(
            cursor = self.cursor,
            action,
            battery_power,
            net_grid_exchange,
            reward,
            "step"
        );

        Step {
            observation: self.observe(),
            reward,
            terminated: false,
            truncated,
            info: StepInfo {
                net_grid_exchange,
                battery_power,
                soc: self.battery.soc(),
            },
        }
    }

    /// Index of the current row.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The current row.
    pub fn row(&self) -> &Record {
        &self.series[self.cursor]
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn weights(&self) -> RewardWeights {
        self.weights
    }

    pub fn min_episode_steps(&self) -> usize {
        self.min_episode_steps
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::default()
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::default()
    }

    fn observe(&self) -> Observation {
        let row = self.row();
        let (time_sin, time_cos) = Observation::time_encoding(row.minutes_since_midnight());
        Observation {
            load: row.load,
            solar: row.solar,
            wind_total: row.wind_total(),
            soc: self.battery.soc(),
            time_sin,
            time_cos,
        }
    }
}
