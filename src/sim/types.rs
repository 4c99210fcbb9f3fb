//! Core environment types: observations, spaces, step outcomes and records.

use std::f32::consts::PI;
use std::fmt;

use chrono::NaiveDateTime;

/// Length of the observation vector.
pub const OBS_DIM: usize = 6;

/// Minutes in one day, used for the time-of-day encoding.
pub const MINUTES_PER_DAY: f32 = 24.0 * 60.0;

/// What the agent sees at one time step.
///
/// Layout as a vector (see [`Observation::to_array`]) is fixed:
/// `[load, solar, wind_total, soc, time_sin, time_cos]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub load: f32,
    pub solar: f32,
    /// Onshore plus offshore wind.
    pub wind_total: f32,
    /// Battery state of charge (0.0 to 1.0).
    pub soc: f32,
    /// Sine of the time-of-day angle.
    pub time_sin: f32,
    /// Cosine of the time-of-day angle.
    pub time_cos: f32,
}

impl Observation {
    /// Encodes minutes since midnight as a point on the unit circle, so that
    /// 23:59 and 00:00 are neighbours.
    ///
    /// # Examples
    ///
    /// ```
    /// use microgrid_env::sim::types::Observation;
    ///
    /// let (sin, cos) = Observation::time_encoding(6 * 60);
    /// assert!((sin - 1.0).abs() < 1e-6);
    /// assert!(cos.abs() < 1e-6);
    /// ```
    pub fn time_encoding(minutes_since_midnight: u32) -> (f32, f32) {
        let angle = 2.0 * PI * (minutes_since_midnight as f32 / MINUTES_PER_DAY);
        angle.sin_cos()
    }

    /// The observation as a flat vector in the fixed layout.
    pub fn to_array(&self) -> [f32; OBS_DIM] {
        [
            self.load,
            self.solar,
            self.wind_total,
            self.soc,
            self.time_sin,
            self.time_cos,
        ]
    }
}

impl From<Observation> for [f32; OBS_DIM] {
    fn from(obs: Observation) -> Self {
        obs.to_array()
    }
}

/// Box bounds of the observation vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationSpace {
    pub low: [f32; OBS_DIM],
    pub high: [f32; OBS_DIM],
}

impl Default for ObservationSpace {
    fn default() -> Self {
        let inf = f32::INFINITY;
        Self {
            low: [-inf, 0.0, 0.0, 0.0, -1.0, -1.0],
            high: [inf, inf, inf, 1.0, 1.0, 1.0],
        }
    }
}

impl ObservationSpace {
    /// Whether every component lies within its bounds.
    pub fn contains(&self, obs: &Observation) -> bool {
        obs.to_array()
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .all(|(v, (lo, hi))| v >= lo && v <= hi)
    }
}

/// Bounds of the scalar action, a fraction of the battery's rated power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionSpace {
    pub low: f32,
    pub high: f32,
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self {
            low: -1.0,
            high: 1.0,
        }
    }
}

/// Diagnostic payload returned by `reset`. Intentionally empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResetInfo {}

/// Diagnostic payload returned by `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    /// Net grid exchange for the step (positive = import, negative = export).
    pub net_grid_exchange: f32,
    /// Power the battery actually accepted (positive) or delivered (negative).
    pub battery_power: f32,
    /// State of charge after the step.
    pub soc: f32,
}

/// Outcome of one environment step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Observation of the next row.
    pub observation: Observation,
    pub reward: f32,
    /// Always false: the environment has no failure state.
    pub terminated: bool,
    /// Set when the cursor reaches the last row of the series.
    pub truncated: bool,
    pub info: StepInfo,
}

impl Step {
    /// Whether the episode is over for either reason.
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Complete record of one evaluation step, as collected by a rollout.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Step index within the episode.
    pub step: usize,
    /// Timestamp of the row the action was issued for.
    pub timestamp: NaiveDateTime,
    /// Action as issued by the policy.
    pub action: f32,
    pub load: f32,
    pub solar: f32,
    pub wind: f32,
    /// Actual battery power (positive = charge, negative = discharge).
    pub battery_power: f32,
    /// Battery SOC after this step (0.0 to 1.0).
    pub soc: f32,
    /// Net grid exchange (positive = import, negative = export).
    pub net_grid_exchange: f32,
    pub reward: f32,
    pub truncated: bool,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} {} | action={:>6.3} | load={:.1}  solar={:.1}  wind={:.1} | \
             bat={:>8.2} (SoC={:.1}%) | grid={:.1}  reward={:.3}{}",
            self.step,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.action,
            self.load,
            self.solar,
            self.wind,
            self.battery_power,
            self.soc * 100.0,
            self.net_grid_exchange,
            self.reward,
            if self.truncated { " [truncated]" } else { "" },
        )
    }
}
