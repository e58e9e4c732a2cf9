//! Data access port trait.

use chrono::{DateTime, Utc};

use crate::domain::bar::Bar;
use crate::domain::error::TradewindError;

pub trait DataPort {
    /// Loads all bars for `symbol`, sorted by timestamp ascending.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, TradewindError>;

    /// First timestamp, last timestamp and bar count, or `None` when the
    /// source holds no bars for `symbol`.
    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, usize)>, TradewindError>;
}
