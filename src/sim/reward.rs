//! Per-step reward shaping.

/// Weights of the two reward penalty terms.
///
/// `reward = -grid * net² - wear * |battery_power|`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardWeights {
    /// Quadratic penalty on net grid exchange (peak shaving).
    pub grid: f32,
    /// Linear penalty on battery power (wear and ageing).
    pub wear: f32,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            grid: 0.001,
            wear: 0.1,
        }
    }
}

impl RewardWeights {
    /// Scores one step. Never positive for non-negative weights.
    pub fn reward(&self, net_grid_exchange: f32, battery_power: f32) -> f32 {
        -self.grid * (net_grid_exchange * net_grid_exchange) - self.wear * battery_power.abs()
    }
}
