//! Grid power balance computation.

/// Computes the net exchange with the external grid.
///
/// Inputs use generation-positive magnitudes for `solar` and `wind`, and the
/// battery convention for `battery_power` (positive = charge, negative = discharge):
///
/// `net = load - solar - wind + battery_power`
///
/// # Returns
///
/// Net grid exchange (positive = import, negative = export)
pub fn grid_net(load: f32, solar: f32, wind: f32, battery_power: f32) -> f32 {
    load - solar - wind + battery_power
}

/// Net load before any battery action.
pub fn residual_load(load: f32, solar: f32, wind: f32) -> f32 {
    grid_net(load, solar, wind, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_only_is_import() {
        assert_eq!(grid_net(3.0, 0.0, 0.0, 0.0), 3.0);
    }

    #[test]
    fn renewable_surplus_is_export() {
        assert_eq!(grid_net(1.0, 2.0, 1.5, 0.0), -2.5);
    }

    #[test]
    fn battery_charge_adds_import() {
        assert_eq!(grid_net(2.0, 1.0, 0.0, 0.5), 1.5);
    }

    #[test]
    fn battery_discharge_reduces_import() {
        assert_eq!(grid_net(2.0, 0.0, 0.0, -1.5), 0.5);
    }

    #[test]
    fn residual_load_ignores_battery() {
        assert_eq!(residual_load(50.0, 10.0, 15.0), 25.0);
    }
}
