//! Average directional index.

use crate::domain::bar::Bar;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::ewm_opt;

/// ADX from exponentially smoothed directional movement over ATR.
///
/// Each directional movement is clipped at zero independently, so an outside
/// bar (higher high and lower low) feeds both sides of DX. A bar where both
/// directional indices vanish contributes no DX value and the smoothed ADX
/// carries forward.
pub fn calculate_adx(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut plus_dm: Vec<Option<f64>> = vec![None; n];
    let mut minus_dm: Vec<Option<f64>> = vec![None; n];
    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        plus_dm[i] = Some(up.max(0.0));
        minus_dm[i] = Some(down.max(0.0));
    }

    let atr = calculate_atr(bars, period);
    let plus_smooth = ewm_opt(&plus_dm, period);
    let minus_smooth = ewm_opt(&minus_dm, period);

    let dx: Vec<Option<f64>> = (0..n)
        .map(|i| {
            let (atr_v, p, m) = match (atr[i], plus_smooth[i], minus_smooth[i]) {
                (Some(a), Some(p), Some(m)) if a > 0.0 => (a, p, m),
                _ => return None,
            };
            let plus_di = 100.0 * p / atr_v;
            let minus_di = 100.0 * m / atr_v;
            let denom = plus_di + minus_di;
            if denom > 0.0 {
                Some(100.0 * (plus_di - minus_di).abs() / denom)
            } else {
                None
            }
        })
        .collect();

    ewm_opt(&dx, period)
}
