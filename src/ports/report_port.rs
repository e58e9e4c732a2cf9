//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradewindError;
use crate::domain::metrics::BacktestMetrics;

/// Port for persisting backtest output.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &BacktestMetrics,
        output_dir: &Path,
    ) -> Result<(), TradewindError>;
}
