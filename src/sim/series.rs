//! Shared exogenous time series and its CSV loader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Timelike};
use tracing::info;

use crate::config::DataConfig;
use crate::error::SeriesError;

/// One timestamped row of exogenous data.
///
/// All power values share the unit of the source table (MW for the default
/// ENTSO-E export).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Row timestamp, UTC.
    pub timestamp: NaiveDateTime,
    /// Total demand.
    pub load: f32,
    /// Solar generation (non-negative).
    pub solar: f32,
    /// Onshore wind generation, zero when the source has no such column.
    pub wind_onshore: f32,
    /// Offshore wind generation, zero when the source has no such column.
    pub wind_offshore: f32,
}

impl Record {
    /// Combined onshore and offshore wind generation.
    pub fn wind_total(&self) -> f32 {
        self.wind_onshore + self.wind_offshore
    }

    /// Minutes elapsed since midnight of the row's day.
    pub fn minutes_since_midnight(&self) -> u32 {
        self.timestamp.hour() * 60 + self.timestamp.minute()
    }
}

/// Read-only, timestamp-sorted exogenous series.
///
/// Cloning is cheap: all clones share one allocation, so any number of
/// environments can read the same data.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    records: Arc<[Record]>,
}

impl TimeSeries {
    /// Builds a series from records, sorting them by timestamp.
    ///
    /// # Errors
    ///
    /// Returns `SeriesError::Empty` for no records, `SeriesError::NonFinite`
    /// if any value is NaN or infinite and `SeriesError::Negative` for negative
    /// solar or wind generation.
    pub fn from_records(mut records: Vec<Record>) -> Result<Self, SeriesError> {
        if records.is_empty() {
            return Err(SeriesError::Empty);
        }
        records.sort_by_key(|r| r.timestamp);

        for (row, r) in records.iter().enumerate() {
            if !r.load.is_finite() {
                return Err(SeriesError::NonFinite { row, field: "load" });
            }
            if !r.solar.is_finite() {
                return Err(SeriesError::NonFinite {
                    row,
                    field: "solar",
                });
            }
            if !r.wind_onshore.is_finite() || !r.wind_offshore.is_finite() {
                return Err(SeriesError::NonFinite { row, field: "wind" });
            }
            if r.solar < 0.0 {
                return Err(SeriesError::Negative {
                    row,
                    field: "solar",
                });
            }
            if r.wind_onshore < 0.0 || r.wind_offshore < 0.0 {
                return Err(SeriesError::Negative { row, field: "wind" });
            }
        }

        Ok(Self {
            records: records.into(),
        })
    }

    /// Loads a series from a CSV file.
    ///
    /// # Errors
    ///
    /// See [`TimeSeries::from_csv_reader`]; additionally fails if the file
    /// cannot be opened.
    pub fn from_csv_path(path: &Path, columns: &DataConfig) -> Result<Self, SeriesError> {
        let file = File::open(path)?;
        let series = Self::from_csv_reader(BufReader::new(file), columns)?;
        info!(
            path = %path.display(),
            rows = series.len(),
            first = %series.records[0].timestamp,
            last = %series.records[series.len() - 1].timestamp,
            "loaded exogenous series"
        );
        Ok(series)
    }

    /// Parses a series from CSV with a header row.
    ///
    /// The timestamp, load and solar columns are required. Wind columns are
    /// optional; a missing column or an empty cell reads as zero.
    ///
    /// # Errors
    ///
    /// Returns a `SeriesError` for a missing required column, an unparseable
    /// value, or an empty table.
    pub fn from_csv_reader<R: Read>(reader: R, columns: &DataConfig) -> Result<Self, SeriesError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| find(name).ok_or_else(|| SeriesError::MissingColumn(name.to_string()));

        let ts_idx = require(&columns.timestamp_column)?;
        let load_idx = require(&columns.load_column)?;
        let solar_idx = require(&columns.solar_column)?;
        let onshore_idx = find(&columns.wind_onshore_column);
        let offshore_idx = find(&columns.wind_offshore_column);

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            let field = |idx: usize| record.get(idx).unwrap_or("");

            let raw_ts = field(ts_idx);
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| SeriesError::InvalidTimestamp {
                row,
                value: raw_ts.to_string(),
            })?;

            let required = |idx: usize, name: &str| -> Result<f32, SeriesError> {
                let raw = field(idx);
                raw.parse::<f32>().map_err(|_| SeriesError::InvalidNumber {
                    row,
                    column: name.to_string(),
                    value: raw.to_string(),
                })
            };
            let optional = |idx: Option<usize>, name: &str| -> Result<f32, SeriesError> {
                match idx.map(field) {
                    None | Some("") => Ok(0.0),
                    Some(raw) => raw.parse::<f32>().map_err(|_| SeriesError::InvalidNumber {
                        row,
                        column: name.to_string(),
                        value: raw.to_string(),
                    }),
                }
            };

            records.push(Record {
                timestamp,
                load: required(load_idx, &columns.load_column)?,
                solar: required(solar_idx, &columns.solar_column)?,
                wind_onshore: optional(onshore_idx, &columns.wind_onshore_column)?,
                wind_offshore: optional(offshore_idx, &columns.wind_offshore_column)?,
            });
        }

        Self::from_records(records)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Deref for TimeSeries {
    type Target = [Record];

    fn deref(&self) -> &[Record] {
        &self.records
    }
}

/// Parses RFC 3339 or naive `T`/space separated timestamps as UTC.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn columns() -> DataConfig {
        DataConfig {
            timestamp_column: "ts".into(),
            load_column: "load".into(),
            solar_column: "solar".into(),
            wind_onshore_column: "wind".into(),
            wind_offshore_column: "offshore".into(),
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 3, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap_or_default()
    }

    fn record(h: u32, load: f32) -> Record {
        Record {
            timestamp: at(h, 0),
            load,
            solar: 0.0,
            wind_onshore: 0.0,
            wind_offshore: 0.0,
        }
    }

    #[test]
    fn from_records_sorts_by_timestamp() {
        let series = TimeSeries::from_records(vec![record(2, 3.0), record(0, 1.0), record(1, 2.0)])
            .expect("valid records");
        let loads: Vec<f32> = series.iter().map(|r| r.load).collect();
        assert_eq!(loads, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn from_records_rejects_empty() {
        assert!(matches!(
            TimeSeries::from_records(Vec::new()),
            Err(SeriesError::Empty)
        ));
    }

    #[test]
    fn from_records_rejects_nan_load() {
        let err = TimeSeries::from_records(vec![record(0, f32::NAN)]);
        assert!(matches!(
            err,
            Err(SeriesError::NonFinite { field: "load", .. })
        ));
    }

    #[test]
    fn from_records_rejects_negative_generation() {
        let solar = Record {
            solar: -5.0,
            ..record(1, 1.0)
        };
        let err = TimeSeries::from_records(vec![record(0, 1.0), solar]);
        assert!(matches!(
            err,
            Err(SeriesError::Negative { row: 1, field: "solar" })
        ));

        let wind = Record {
            wind_offshore: -3.0,
            ..record(0, 1.0)
        };
        let err = TimeSeries::from_records(vec![wind]);
        assert!(matches!(
            err,
            Err(SeriesError::Negative { row: 0, field: "wind" })
        ));
    }

    #[test]
    fn from_records_accepts_negative_load() {
        let series = TimeSeries::from_records(vec![record(0, -10.0)]).expect("valid records");
        assert_eq!(series[0].load, -10.0);
    }

    #[test]
    fn clones_share_storage() {
        let a = TimeSeries::from_records(vec![record(0, 1.0)]).expect("valid records");
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.records, &b.records));
    }

    #[test]
    fn wind_total_sums_components() {
        let r = Record {
            wind_onshore: 120.5,
            wind_offshore: 30.25,
            ..record(0, 1.0)
        };
        assert_eq!(r.wind_total(), 150.75);
    }

    #[test]
    fn minutes_since_midnight() {
        let r = Record {
            timestamp: at(23, 45),
            ..record(0, 1.0)
        };
        assert_eq!(r.minutes_since_midnight(), 23 * 60 + 45);
    }

    #[test]
    fn csv_parses_and_sorts() {
        let csv = "\
ts,load,solar,wind,offshore
2016-03-01T00:15:00Z,110,0,20,5
2016-03-01T00:00:00Z,100,0,10,4
";
        let series = TimeSeries::from_csv_reader(csv.as_bytes(), &columns()).expect("valid csv");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].load, 100.0);
        assert_eq!(series[0].wind_total(), 14.0);
        assert_eq!(series[1].timestamp, at(0, 15));
    }

    #[test]
    fn csv_missing_optional_columns_read_as_zero() {
        let csv = "ts,load,solar\n2016-03-01 06:00:00,100,12.5\n";
        let series = TimeSeries::from_csv_reader(csv.as_bytes(), &columns()).expect("valid csv");
        assert_eq!(series[0].wind_total(), 0.0);
        assert_eq!(series[0].solar, 12.5);
    }

    #[test]
    fn csv_empty_wind_cell_reads_as_zero() {
        let csv = "ts,load,solar,wind,offshore\n2016-03-01T06:00:00,100,1,,7\n";
        let series = TimeSeries::from_csv_reader(csv.as_bytes(), &columns()).expect("valid csv");
        assert_eq!(series[0].wind_onshore, 0.0);
        assert_eq!(series[0].wind_offshore, 7.0);
    }

    #[test]
    fn csv_missing_load_column_fails() {
        let csv = "ts,solar\n2016-03-01T06:00:00,1\n";
        let err = TimeSeries::from_csv_reader(csv.as_bytes(), &columns());
        assert!(matches!(err, Err(SeriesError::MissingColumn(c)) if c == "load"));
    }

    #[test]
    fn csv_bad_number_reports_row_and_column() {
        let csv = "ts,load,solar\n2016-03-01T06:00:00,100,1\n2016-03-01T06:15:00,abc,1\n";
        let err = TimeSeries::from_csv_reader(csv.as_bytes(), &columns());
        match err {
            Err(SeriesError::InvalidNumber { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "load");
                assert_eq!(value, "abc");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn csv_bad_timestamp_fails() {
        let csv = "ts,load,solar\nyesterday,100,1\n";
        let err = TimeSeries::from_csv_reader(csv.as_bytes(), &columns());
        assert!(matches!(err, Err(SeriesError::InvalidTimestamp { row: 0, .. })));
    }

    #[test]
    fn csv_header_only_is_empty() {
        let csv = "ts,load,solar\n";
        let err = TimeSeries::from_csv_reader(csv.as_bytes(), &columns());
        assert!(matches!(err, Err(SeriesError::Empty)));
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(parse_timestamp("2016-03-01T06:30:00Z"), Some(at(6, 30)));
        assert_eq!(parse_timestamp("2016-03-01T07:30:00+01:00"), Some(at(6, 30)));
        assert_eq!(parse_timestamp("2016-03-01 06:30:00"), Some(at(6, 30)));
        assert_eq!(parse_timestamp("2016-03-01T06:30"), Some(at(6, 30)));
        assert_eq!(parse_timestamp("06:30"), None);
    }
}
