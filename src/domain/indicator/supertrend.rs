//! Supertrend bands and direction flag.

use crate::domain::bar::Bar;
use crate::domain::indicator::atr::calculate_atr;

pub struct Supertrend {
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub up: Vec<Option<bool>>,
}

/// Bands sit `multiplier` ATRs around the hl2 midpoint; the direction flag
/// is simply "close above the lower band". Undefined until ATR warms up.
pub fn calculate_supertrend(bars: &[Bar], period: usize, multiplier: f64) -> Supertrend {
    let atr = calculate_atr(bars, period);
    let mut upper = Vec::with_capacity(bars.len());
    let mut lower = Vec::with_capacity(bars.len());
    let mut up = Vec::with_capacity(bars.len());

    for (bar, atr_v) in bars.iter().zip(atr.iter()) {
        match atr_v {
            Some(atr_v) => {
                let hl2 = bar.hl2();
                let band_lower = hl2 - multiplier * atr_v;
                upper.push(Some(hl2 + multiplier * atr_v));
                lower.push(Some(band_lower));
                up.push(Some(bar.close > band_lower));
            }
            None => {
                upper.push(None);
                lower.push(None);
                up.push(None);
            }
        }
    }

    Supertrend { upper, lower, up }
}
