//! Relative strength index over rolling-mean gains and losses.

use crate::domain::bar::Bar;
use crate::domain::indicator::rolling_mean_opt;

/// RSI from simple rolling averages of gains and losses.
///
/// The first delta is undefined, so outputs start at index `period`. When the
/// window shows gains but no losses the value saturates at 100; a window with
/// neither gains nor losses has no defined value.
pub fn calculate_rsi(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let mut gains: Vec<Option<f64>> = Vec::with_capacity(bars.len());
    let mut losses: Vec<Option<f64>> = Vec::with_capacity(bars.len());
    gains.push(None);
    losses.push(None);
    for pair in bars.windows(2) {
        let delta = pair[1].close - pair[0].close;
        gains.push(Some(delta.max(0.0)));
        losses.push(Some((-delta).max(0.0)));
    }

    let avg_gain = rolling_mean_opt(&gains, period);
    let avg_loss = rolling_mean_opt(&losses, period);

    avg_gain
        .iter()
        .zip(avg_loss.iter())
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => {
                if *l > 0.0 {
                    let rs = g / l;
                    Some(100.0 - 100.0 / (1.0 + rs))
                } else if *g > 0.0 {
                    Some(100.0)
                } else {
                    None
                }
            }
            _ => None,
        })
        .collect()
}
