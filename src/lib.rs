//! Microgrid battery-control simulation environment.

pub mod config;
pub mod devices;
pub mod error;
pub mod io;
pub mod logging;
/// Environment, series, policies, rollouts and KPIs.
pub mod sim;
