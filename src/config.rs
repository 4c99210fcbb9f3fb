//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::devices::Battery;
use crate::sim::env::EnvOptions;
use crate::sim::reward::RewardWeights;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Step timing, episode window and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Reward weights.
    #[serde(default)]
    pub reward: RewardConfig,
    /// Evaluation policy selection.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Input column names.
    #[serde(default)]
    pub data: DataConfig,
}

/// Step timing, episode window and seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Duration of one step in hours (quarter-hour data by default).
    pub step_hours: f32,
    /// Steps guaranteed to remain after a random episode start.
    pub min_episode_steps: usize,
    /// Step budget for evaluation rollouts.
    pub episode_steps: usize,
    /// Seed for episode start selection.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_hours: 0.25,
            min_episode_steps: 24 * 4 * 7,
            episode_steps: 24 * 4 * 7,
            seed: 42,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Energy capacity.
    pub capacity: f32,
    /// Charge/discharge power limit.
    pub max_rate: f32,
    /// Round-trip efficiency (0.0–1.0).
    pub efficiency: f32,
    /// State of charge at the start of every episode (0.0–1.0).
    pub initial_soc: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity: 1000.0,
            max_rate: 250.0,
            efficiency: 0.95,
            initial_soc: 0.5,
        }
    }
}

/// Reward weights.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardConfig {
    /// Weight of the squared net grid exchange.
    pub grid_weight: f32,
    /// Weight of the absolute battery power (wear cost).
    pub wear_weight: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            grid_weight: 0.001,
            wear_weight: 0.1,
        }
    }
}

/// Evaluation policy selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Policy type: `"idle"` or `"peak_shaving"`.
    pub name: String,
    /// Smoothing factor of the peak-shaving net load mean (0.0–1.0].
    pub smoothing: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            name: "idle".to_string(),
            smoothing: 0.02,
        }
    }
}

/// Input column names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub timestamp_column: String,
    pub load_column: String,
    pub solar_column: String,
    /// Optional; missing values read as zero.
    pub wind_onshore_column: String,
    /// Optional; missing values read as zero.
    pub wind_offshore_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            timestamp_column: "utc_timestamp".to_string(),
            load_column: "DE_load_actual_entsoe_transparency".to_string(),
            solar_column: "DE_solar_generation_actual".to_string(),
            wind_onshore_column: "DE_wind_generation_actual".to_string(),
            wind_offshore_column: "DE_wind_offshore_generation_actual".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Available policy names.
    pub const POLICIES: &[&str] = &["idle", "peak_shaving"];

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "small_battery", "wear_averse"];

    /// Returns the baseline scenario: a 1000 MWh / 250 MW battery on quarter-hour data.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the small-battery preset: 100 / 50 unit storage.
    pub fn small_battery() -> Self {
        Self {
            battery: BatteryConfig {
                capacity: 100.0,
                max_rate: 50.0,
                ..BatteryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the wear-averse preset: battery use is penalized five times harder.
    pub fn wear_averse() -> Self {
        Self {
            reward: RewardConfig {
                wear_weight: 0.5,
                ..RewardConfig::default()
            },
            ..Self::default()
        }
    }

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "small_battery" => Ok(Self::small_battery()),
            "wear_averse" => Ok(Self::wear_averse()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if !(s.step_hours.is_finite() && s.step_hours > 0.0) {
            errors.push(ConfigError::new("simulation.step_hours", "must be > 0"));
        }
        if s.min_episode_steps == 0 {
            errors.push(ConfigError::new("simulation.min_episode_steps", "must be > 0"));
        }
        if s.episode_steps == 0 {
            errors.push(ConfigError::new("simulation.episode_steps", "must be > 0"));
        }

        let bat = &self.battery;
        if !(bat.capacity.is_finite() && bat.capacity > 0.0) {
            errors.push(ConfigError::new("battery.capacity", "must be > 0"));
        }
        if !(bat.max_rate.is_finite() && bat.max_rate > 0.0) {
            errors.push(ConfigError::new("battery.max_rate", "must be > 0"));
        }
        if !(bat.efficiency > 0.0 && bat.efficiency <= 1.0) {
            errors.push(ConfigError::new("battery.efficiency", "must be in (0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&bat.initial_soc) {
            errors.push(ConfigError::new("battery.initial_soc", "must be in [0.0, 1.0]"));
        }

        let r = &self.reward;
        if !(r.grid_weight.is_finite() && r.grid_weight >= 0.0) {
            errors.push(ConfigError::new("reward.grid_weight", "must be >= 0"));
        }
        if !(r.wear_weight.is_finite() && r.wear_weight >= 0.0) {
            errors.push(ConfigError::new("reward.wear_weight", "must be >= 0"));
        }

        let p = &self.policy;
        if !Self::POLICIES.contains(&p.name.as_str()) {
            errors.push(ConfigError::new(
                "policy.name",
                format!(
                    "must be one of {}, got \"{}\"",
                    Self::POLICIES.join(", "),
                    p.name
                ),
            ));
        }
        if !(p.smoothing > 0.0 && p.smoothing <= 1.0) {
            errors.push(ConfigError::new("policy.smoothing", "must be in (0.0, 1.0]"));
        }

        let d = &self.data;
        for (field, value) in [
            ("data.timestamp_column", &d.timestamp_column),
            ("data.load_column", &d.load_column),
            ("data.solar_column", &d.solar_column),
        ] {
            if value.trim().is_empty() {
                errors.push(ConfigError::new(field, "must not be empty"));
            }
        }

        errors
    }

    /// Builds the battery described by this scenario.
    ///
    /// # Panics
    ///
    /// Panics on battery parameters that [`ScenarioConfig::validate`] rejects.
    pub fn build_battery(&self) -> Battery {
        let b = &self.battery;
        Battery::new(
            b.capacity,
            b.max_rate,
            b.efficiency,
            b.initial_soc,
            self.simulation.step_hours,
        )
    }

    /// Environment options described by this scenario.
    pub fn env_options(&self) -> EnvOptions {
        EnvOptions {
            weights: RewardWeights {
                grid: self.reward.grid_weight,
                wear: self.reward.wear_weight,
            },
            min_episode_steps: self.simulation.min_episode_steps,
            seed: self.simulation.seed,
        }
    }
}
