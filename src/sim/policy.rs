//! Battery control policies used to drive evaluation rollouts.
//!
//! Learned policies live outside this crate; the ones here are non-learned
//! baselines that exercise the environment through the same action contract.

use super::power_balance::residual_load;
use super::types::Observation;

/// Maps an observation to a scalar action in `[-1, 1]`.
pub trait Policy {
    /// Chooses the action for the row described by `observation`.
    fn act(&mut self, observation: &Observation) -> f32;

    /// Returns a short name for reports.
    fn name(&self) -> &'static str;
}

/// Never commands the battery.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn act(&mut self, _observation: &Observation) -> f32 {
        0.0
    }

    fn name(&self) -> &'static str {
        "idle"
    }
}

/// Flattens net grid exchange toward its running mean.
///
/// Keeps an exponentially smoothed mean of the residual load
/// (`load - solar - wind_total`) and commands the battery power that would put
/// the grid exchange on that mean:
///
/// `grid = residual + battery`, so `battery = mean - residual`.
///
/// Above-average residual load discharges, below-average charges.
#[derive(Debug, Clone)]
pub struct PeakShavingPolicy {
    max_rate: f32,
    smoothing: f32,
    mean: Option<f32>,
}

impl PeakShavingPolicy {
    /// Creates a peak-shaving policy.
    ///
    /// # Arguments
    ///
    /// * `max_rate` - Battery power limit used to scale commands into actions (must be > 0)
    /// * `smoothing` - Weight of the newest residual in the running mean, in (0, 1]
    ///
    /// # Panics
    ///
    /// Panics if `max_rate` or `smoothing` is out of range.
    pub fn new(max_rate: f32, smoothing: f32) -> Self {
        assert!(max_rate > 0.0);
        assert!(smoothing > 0.0 && smoothing <= 1.0);
        Self {
            max_rate,
            smoothing,
            mean: None,
        }
    }

    /// Current running mean of the residual load, if any row was seen.
    pub fn mean(&self) -> Option<f32> {
        self.mean
    }
}

impl Policy for PeakShavingPolicy {
    fn act(&mut self, observation: &Observation) -> f32 {
        let residual = residual_load(observation.load, observation.solar, observation.wind_total);
        let mean = match self.mean {
            Some(m) => m + self.smoothing * (residual - m),
            None => residual,
        };
        self.mean = Some(mean);

        ((mean - residual) / self.max_rate).clamp(-1.0, 1.0)
    }

    fn name(&self) -> &'static str {
        "peak_shaving"
    }
}
