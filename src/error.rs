//! Error types for series loading and environment construction.

use std::io;

use thiserror::Error;

/// Fatal problems with the input time series, raised at load time.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("cannot read series: {0}")]
    Io(#[from] io::Error),

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column \"{0}\" not found in header")]
    MissingColumn(String),

    #[error("row {row}: column \"{column}\" has invalid number \"{value}\"")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: invalid timestamp \"{value}\"")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: {field} must be finite")]
    NonFinite { row: usize, field: &'static str },

    #[error("row {row}: {field} must not be negative")]
    Negative { row: usize, field: &'static str },

    #[error("series contains no rows")]
    Empty,
}

/// Errors raised while building or positioning a [`crate::sim::env::GridEnv`].
#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(
        "series has {len} rows but episodes need more than {required} (one full episode window)"
    )]
    SeriesTooShort { len: usize, required: usize },

    #[error("start index {start} is outside the series (length {len})")]
    StartOutOfRange { start: usize, len: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}
