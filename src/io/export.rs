//! CSV and JSON export of episode step records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::types::StepRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "step,timestamp,action,load,solar,wind,battery_power,soc,\
                      net_grid_exchange,reward,truncated";

/// Exports step records to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[StepRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes step records as CSV to any writer.
///
/// Writes a header row followed by one data row per step. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[StepRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.step.to_string(),
            r.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            format!("{:.4}", r.action),
            format!("{:.4}", r.load),
            format!("{:.4}", r.solar),
            format!("{:.4}", r.wind),
            format!("{:.4}", r.battery_power),
            format!("{:.6}", r.soc),
            format!("{:.4}", r.net_grid_exchange),
            format!("{:.6}", r.reward),
            r.truncated.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Column-oriented trace of an episode, one array per quantity.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeTrace {
    pub timestamps: Vec<String>,
    pub load: Vec<f32>,
    pub solar: Vec<f32>,
    pub wind: Vec<f32>,
    pub soc: Vec<f32>,
    pub net_grid: Vec<f32>,
    pub actions: Vec<f32>,
    pub rewards: Vec<f32>,
}

impl EpisodeTrace {
    pub fn from_records(records: &[StepRecord]) -> Self {
        Self {
            timestamps: records
                .iter()
                .map(|r| r.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
                .collect(),
            load: records.iter().map(|r| r.load).collect(),
            solar: records.iter().map(|r| r.solar).collect(),
            wind: records.iter().map(|r| r.wind).collect(),
            soc: records.iter().map(|r| r.soc).collect(),
            net_grid: records.iter().map(|r| r.net_grid_exchange).collect(),
            actions: records.iter().map(|r| r.action).collect(),
            rewards: records.iter().map(|r| r.reward).collect(),
        }
    }
}

/// Exports step records as a JSON trace to the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization or writing fails.
pub fn export_json(records: &[StepRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_json(records, buf)
}

/// Writes step records as a pretty-printed JSON trace to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_json(records: &[StepRecord], mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, &EpisodeTrace::from_records(records))?;
    writer.flush()
}
