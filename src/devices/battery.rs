use tracing::warn;

/// Default state of charge a battery starts from and returns to on reset.
pub const DEFAULT_INITIAL_SOC: f32 = 0.5;

/// A grid-scale battery energy storage unit.
///
/// `Battery` models one storage device with a fixed energy capacity, a
/// symmetric charge/discharge power limit, and a round-trip efficiency
/// that is split evenly across both directions (`sqrt(efficiency)` each way).
///
/// # Power Convention
/// - Positive power: Charging (absorbing power from the grid)
/// - Negative power: Discharging (supplying power to the grid)
///
/// # Examples
///
/// ```
/// use microgrid_env::devices::Battery;
///
/// let mut battery = Battery::new(1000.0, 250.0, 0.95, 0.5, 0.25);
/// let actual = battery.step(250.0);
/// assert_eq!(actual, 250.0);
/// assert!((battery.soc() - 0.5609).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Battery {
    /// Energy capacity (MWh in the default data set).
    capacity: f32,

    /// Maximum charge and discharge power (MW, positive value).
    max_rate: f32,

    /// Round-trip efficiency (0..=1.0).
    efficiency: f32,

    /// State of charge as a fraction (0.0 to 1.0).
    soc: f32,

    /// Stored energy, always `soc * capacity`.
    stored_energy: f32,

    /// State of charge restored by [`Battery::reset`].
    initial_soc: f32,

    /// Duration of one step in hours.
    step_hours: f32,
}

impl Battery {
    /// Creates a new battery.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Energy capacity (must be > 0)
    /// * `max_rate` - Charge/discharge power limit (must be > 0)
    /// * `efficiency` - Round-trip efficiency in (0, 1]
    /// * `initial_soc` - State of charge at construction and after reset, in [0, 1]
    /// * `step_hours` - Duration of one [`Battery::step`] call in hours (must be > 0)
    ///
    /// # Panics
    ///
    /// Panics if any parameter is outside its range.
    pub fn new(
        capacity: f32,
        max_rate: f32,
        efficiency: f32,
        initial_soc: f32,
        step_hours: f32,
    ) -> Self {
        assert!(capacity > 0.0);
        assert!(max_rate > 0.0);
        assert!(efficiency > 0.0 && efficiency <= 1.0);
        assert!((0.0..=1.0).contains(&initial_soc));
        assert!(step_hours > 0.0);

        Self {
            capacity,
            max_rate,
            efficiency,
            soc: initial_soc,
            stored_energy: initial_soc * capacity,
            initial_soc,
            step_hours,
        }
    }

    /// Applies one step of the requested power and returns the power the
    /// battery actually accepted (charge) or delivered (discharge).
    ///
    /// The request is clamped to `[-max_rate, max_rate]`. When the resulting
    /// energy change would overfill or drain the battery, the stored energy
    /// is pinned to the boundary and the returned power is back-solved so that
    /// it exactly reaches it. This never fails; it only saturates.
    pub fn step(&mut self, requested_power: f32) -> f32 {
        let requested = if requested_power.is_nan() {
            warn!("battery received NaN power command, treating as idle");
            0.0
        } else {
            requested_power
        };

        let power = requested.clamp(-self.max_rate, self.max_rate);
        let dt = self.step_hours;
        let eff = self.efficiency.sqrt();

        let (stored_energy, actual_power) = if power >= 0.0 {
            // Charging: losses on the way in
            let tentative = self.stored_energy + power * dt * eff;
            if tentative > self.capacity {
                let actual = (self.capacity - self.stored_energy) / (dt * eff);
                (self.capacity, actual)
            } else {
                (tentative, power)
            }
        } else {
            // Discharging: more energy leaves storage than is delivered
            let tentative = self.stored_energy + power * dt / eff;
            if tentative < 0.0 {
                let actual = -self.stored_energy * eff / dt;
                (0.0, actual)
            } else {
                (tentative, power)
            }
        };

        self.stored_energy = stored_energy;
        self.soc = stored_energy / self.capacity;

        actual_power
    }

    /// Restores the initial state of charge.
    pub fn reset(&mut self) {
        self.soc = self.initial_soc;
        self.stored_energy = self.initial_soc * self.capacity;
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    pub fn max_rate(&self) -> f32 {
        self.max_rate
    }

    pub fn efficiency(&self) -> f32 {
        self.efficiency
    }

    /// State of charge as a fraction (0.0 to 1.0).
    pub fn soc(&self) -> f32 {
        self.soc
    }

    pub fn stored_energy(&self) -> f32 {
        self.stored_energy
    }

    pub fn step_hours(&self) -> f32 {
        self.step_hours
    }
}
