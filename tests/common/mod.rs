//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use microgrid_env::config::ScenarioConfig;
use microgrid_env::devices::Battery;
use microgrid_env::sim::env::GridEnv;
use microgrid_env::sim::series::{Record, TimeSeries};

/// Rows per day at quarter-hour resolution.
pub const STEPS_PER_DAY: usize = 96;

/// Default series length: ten days, comfortably longer than the one-week window.
pub const SERIES_LEN: usize = 10 * STEPS_PER_DAY;

/// Midnight of the first synthetic day.
pub fn series_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 4, 3)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Synthetic quarter-hour series with a daily load cycle, a midday solar
/// bell and steady wind.
pub fn synthetic_series(len: usize) -> TimeSeries {
    let start = series_start();
    let records = (0..len)
        .map(|i| {
            let phase = (i % STEPS_PER_DAY) as f32 / STEPS_PER_DAY as f32;
            let daylight = (std::f32::consts::PI * (phase - 0.25) * 2.0).sin().max(0.0);
            Record {
                timestamp: start + Duration::minutes(15 * i as i64),
                load: 55_000.0 + 8_000.0 * (std::f32::consts::TAU * (phase - 0.3)).sin(),
                solar: 20_000.0 * daylight,
                wind_onshore: 9_000.0,
                wind_offshore: 2_000.0,
            }
        })
        .collect();
    TimeSeries::from_records(records).expect("synthetic records are valid")
}

/// Battery of the baseline scenario (1000 / 250, 95% round trip, 0.25 h steps).
pub fn default_battery() -> Battery {
    ScenarioConfig::baseline().build_battery()
}

/// Baseline-scenario environment over [`synthetic_series`] of `len` rows.
pub fn default_env(len: usize) -> GridEnv {
    let cfg = ScenarioConfig::baseline();
    GridEnv::new(synthetic_series(len), cfg.build_battery(), cfg.env_options())
        .expect("series longer than the episode window")
}

/// CSV text in the default ENTSO-E column layout, rows deliberately unsorted.
pub fn entsoe_csv() -> String {
    let mut out = String::from(
        "utc_timestamp,DE_load_actual_entsoe_transparency,DE_solar_generation_actual,\
         DE_wind_generation_actual,DE_wind_offshore_generation_actual\n",
    );
    let start = series_start();
    let mut rows: Vec<usize> = (0..800).collect();
    rows.swap(0, 10);
    rows.swap(5, 799);
    for i in rows {
        let ts = start + Duration::minutes(15 * i as i64);
        let offshore = if i % 7 == 0 {
            String::new()
        } else {
            "1500".to_string()
        };
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            ts.format("%Y-%m-%dT%H:%M:%SZ"),
            50_000 + i,
            if (24..72).contains(&(i % 96)) { 10_000 } else { 0 },
            8_000,
            offshore
        ));
    }
    out
}
