//! Device simulation components for the microgrid.

/// Grid-scale battery storage model.
pub mod battery;

pub use battery::Battery;
