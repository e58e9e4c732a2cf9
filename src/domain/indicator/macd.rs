//! MACD line and its signal line.

use crate::domain::bar::Bar;
use crate::domain::indicator::ewm;

/// MACD = EMA(close, fast) - EMA(close, slow); signal = EMA(macd, signal).
///
/// Exponential means are seeded with the first close, so both columns are
/// defined from the first bar.
pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>) {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ewm(&closes, fast);
    let ema_slow = ewm(&closes, slow);
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ewm(&macd, signal);
    (macd, signal_line)
}
