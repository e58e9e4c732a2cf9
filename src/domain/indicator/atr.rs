//! Average true range.

use crate::domain::bar::Bar;
use crate::domain::indicator::rolling_mean;

/// True range per bar; the first bar has no previous close, so its range is
/// simply high - low.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            out.push(bar.high - bar.low);
        } else {
            out.push(bar.true_range(bars[i - 1].close));
        }
    }
    out
}

/// ATR as the rolling mean of the true range.
pub fn calculate_atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_ranges(bars), period)
}
