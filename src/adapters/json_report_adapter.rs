//! JSON report adapter.
//!
//! Writes `metrics.json` and `trades.json` into the output directory.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradewindError;
use crate::domain::metrics::BacktestMetrics;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json_error(e: serde_json::Error) -> TradewindError {
    TradewindError::Data {
        reason: format!("failed to serialize report: {}", e),
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &BacktestMetrics,
        output_dir: &Path,
    ) -> Result<(), TradewindError> {
        fs::create_dir_all(output_dir)?;

        let metrics_path = output_dir.join("metrics.json");
        let metrics_json = serde_json::to_string_pretty(metrics).map_err(to_json_error)?;
        fs::write(&metrics_path, metrics_json)?;
        tracing::info!(path = %metrics_path.display(), "metrics written");

        if result.trades.is_empty() {
            tracing::warn!("no trades to write");
            return Ok(());
        }
        let trades_path = output_dir.join("trades.json");
        let trades_json =
            serde_json::to_string_pretty(&result.trades).map_err(to_json_error)?;
        fs::write(&trades_path, trades_json)?;
        tracing::info!(path = %trades_path.display(), trades = result.trades.len(), "trade log written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::Trade;
    use crate::domain::metrics::compute_metrics;
    use crate::domain::signal::Regime;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_result(with_trades: bool) -> BacktestResult {
        let trades = if with_trades {
            let entry_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            vec![Trade {
                sequence_id: 1,
                entry_time,
                exit_time: entry_time + chrono::Duration::hours(6),
                entry_price: 100.0,
                exit_price: 110.0,
                shares: 10.0,
                gross_profit: 100.0,
                fees: 2.1,
                net_profit: 97.9,
                regime: Regime::Trend,
            }]
        } else {
            Vec::new()
        };
        let final_capital = 1_000.0 + trades.iter().map(|t| t.net_profit).sum::<f64>();
        BacktestResult {
            initial_capital: 1_000.0,
            final_capital,
            trades,
        }
    }

    #[test]
    fn writes_metrics_and_trades() {
        let dir = TempDir::new().unwrap();
        let result = sample_result(true);
        let metrics = compute_metrics(&result);
        JsonReportAdapter::new()
            .write(&result, &metrics, dir.path())
            .unwrap();

        let metrics_raw = fs::read_to_string(dir.path().join("metrics.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&metrics_raw).unwrap();
        assert_eq!(parsed["trades"]["number_of_trades"], 1);

        let trades_raw = fs::read_to_string(dir.path().join("trades.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&trades_raw).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["regime"], "trend");
    }

    #[test]
    fn skips_trade_log_when_no_trades() {
        let dir = TempDir::new().unwrap();
        let result = sample_result(false);
        let metrics = compute_metrics(&result);
        JsonReportAdapter::new()
            .write(&result, &metrics, dir.path())
            .unwrap();
        assert!(dir.path().join("metrics.json").exists());
        assert!(!dir.path().join("trades.json").exists());
    }

    #[test]
    fn creates_nested_output_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("results").join("run1");
        let result = sample_result(false);
        let metrics = compute_metrics(&result);
        JsonReportAdapter::new()
            .write(&result, &metrics, &nested)
            .unwrap();
        assert!(nested.join("metrics.json").exists());
    }
}
