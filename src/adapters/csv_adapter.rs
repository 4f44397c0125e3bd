//! CSV file data adapter.
//!
//! Columns are located by header name, case-insensitively. `open`, `high`,
//! `low`, `close` and `volume` are required; a `time`, `timestamp` or `date`
//! column is optional. Rows without a timestamp column are stamped with their
//! row index as Unix seconds.

use crate::domain::error::PinebtError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::path::PathBuf;
use tracing::debug;

const REQUIRED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];
const TIME_COLUMNS: [&str; 3] = ["time", "timestamp", "date"];

pub struct CsvAdapter {
    path: PathBuf,
}

struct ColumnMap {
    prices: [usize; 5],
    time: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, PinebtError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let mut prices = [0usize; 5];
        for (slot, name) in prices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = find(name).ok_or_else(|| PinebtError::MissingColumn {
                column: name.to_string(),
            })?;
        }
        let time = TIME_COLUMNS.iter().find_map(|name| find(name));
        Ok(Self { prices, time })
    }
}

impl CsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_bar(columns: &ColumnMap, record: &StringRecord, row: usize) -> Result<Bar, PinebtError> {
        let mut values = [0.0_f64; 5];
        for (value, (&index, name)) in values
            .iter_mut()
            .zip(columns.prices.iter().zip(REQUIRED_COLUMNS))
        {
            let raw = record.get(index).unwrap_or_default().trim();
            *value = raw.parse().map_err(|_| PinebtError::InvalidData {
                row,
                reason: format!("invalid {} value '{}'", name, raw),
            })?;
        }
        let timestamp = match columns.time {
            Some(index) => {
                let raw = record.get(index).unwrap_or_default().trim();
                parse_timestamp(raw).ok_or_else(|| PinebtError::InvalidData {
                    row,
                    reason: format!("invalid timestamp '{}'", raw),
                })?
            }
            None => row_timestamp(row),
        };
        let [open, high, low, close, volume] = values;
        Ok(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

fn row_timestamp(row: usize) -> NaiveDateTime {
    DateTime::from_timestamp(row as i64, 0)
        .unwrap_or_default()
        .naive_utc()
}

/// RFC 3339, `%Y-%m-%d %H:%M:%S`, `%Y-%m-%d`, or integer Unix seconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.naive_utc())
}

impl DataPort for CsvAdapter {
    fn load_bars(&self) -> Result<Vec<Bar>, PinebtError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| csv_error(&self.path, e))?;

        let headers = rdr.headers().map_err(|e| csv_error(&self.path, e))?.clone();
        let columns = ColumnMap::from_headers(&headers)?;

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| PinebtError::InvalidData {
                row,
                reason: e.to_string(),
            })?;
            bars.push(Self::parse_bar(&columns, &record, row)?);
        }

        debug!(path = %self.path.display(), bars = bars.len(), "loaded market data");
        Ok(bars)
    }
}

fn csv_error(path: &std::path::Path, err: csv::Error) -> PinebtError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => PinebtError::Io(io),
        other => PinebtError::InvalidData {
            row: 0,
            reason: format!("{}: {:?}", path.display(), other),
        },
    }
}
