//! CSV file data adapter.
//!
//! Expects one `<symbol>.csv` per symbol under the base directory with a
//! header row and columns `timestamp,open,high,low,close,volume`.

use crate::domain::bar::Bar;
use crate::domain::error::TradewindError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn data_error(reason: String) -> TradewindError {
    TradewindError::Data { reason }
}

/// Accepts `2024-01-15 12:00:00` or bare `2024-01-15` (midnight), as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TradewindError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| data_error(format!("invalid timestamp '{}': {}", raw, e)))
}

fn parse_f64(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TradewindError> {
    record
        .get(index)
        .ok_or_else(|| data_error(format!("missing {} column", name)))?
        .parse()
        .map_err(|e| data_error(format!("invalid {} value: {}", name, e)))
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, TradewindError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;

            let raw_ts = record
                .get(0)
                .ok_or_else(|| data_error("missing timestamp column".into()))?;
            let timestamp = parse_timestamp(raw_ts)?;

            bars.push(Bar {
                timestamp,
                open: parse_f64(&record, 1, "open")?,
                high: parse_f64(&record, 2, "high")?,
                low: parse_f64(&record, 3, "low")?,
                close: parse_f64(&record, 4, "close")?,
                volume: parse_f64(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, usize)>, TradewindError> {
        let bars = self.fetch_bars(symbol)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => {
                Ok(Some((first.timestamp, last.timestamp, bars.len())))
            }
            _ => Ok(None),
        }
    }
}
