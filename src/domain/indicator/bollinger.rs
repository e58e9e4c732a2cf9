//! Bollinger bands.

use crate::domain::bar::Bar;
use crate::domain::indicator::{rolling_mean, rolling_std};

pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub mid: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Mid band is the close SMA; upper/lower sit `std_dev` sample standard
/// deviations away.
pub fn calculate_bollinger(bars: &[Bar], period: usize, std_dev: f64) -> BollingerBands {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let mid = rolling_mean(&closes, period);
    let std = rolling_std(&closes, period);
    let upper = mid
        .iter()
        .zip(std.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m + std_dev * s),
            _ => None,
        })
        .collect();
    let lower = mid
        .iter()
        .zip(std.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - std_dev * s),
            _ => None,
        })
        .collect();
    BollingerBands { upper, mid, lower }
}
