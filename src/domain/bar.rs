//! OHLCV bar representation and indicator-enriched bars.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// (high + low) / 2, the supertrend band midpoint.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// A [`Bar`] plus the derived indicator columns.
///
/// `None` means the rolling computation behind a field has not warmed up yet
/// (or hit a 0/0), and the bar must be excluded from decision-making.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBar {
    pub bar: Bar,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub atr: Option<f64>,
    pub atr_sma: Option<f64>,
    pub adx: Option<f64>,
    pub volume_sma: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_mid: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub supertrend_upper: Option<f64>,
    pub supertrend_lower: Option<f64>,
    pub supertrend_up: Option<bool>,
}

impl EnrichedBar {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.bar.timestamp
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    pub fn volume(&self) -> f64 {
        self.bar.volume
    }

    /// True when every indicator column is defined.
    pub fn indicators_ready(&self) -> bool {
        self.sma_short.is_some()
            && self.sma_long.is_some()
            && self.rsi.is_some()
            && self.macd.is_some()
            && self.macd_signal.is_some()
            && self.atr.is_some()
            && self.atr_sma.is_some()
            && self.adx.is_some()
            && self.volume_sma.is_some()
            && self.bollinger_upper.is_some()
            && self.bollinger_mid.is_some()
            && self.bollinger_lower.is_some()
            && self.supertrend_upper.is_some()
            && self.supertrend_lower.is_some()
            && self.supertrend_up.is_some()
    }
}
