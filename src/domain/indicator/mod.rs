//! Indicator columns computed over a bar series.
//!
//! Each submodule maps `&[Bar]` to one or more columns of the same length,
//! with `None` marking positions where a rolling computation has not warmed
//! up yet (the exponentially-smoothed MACD columns are defined everywhere).
//! The shared rolling/exponential primitives live here.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod supertrend;

/// Simple moving average over a fully-defined series.
///
/// The first `period - 1` outputs are `None`.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = Some(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = Some(sum / period as f64);
    }
    out
}

/// Rolling mean over a series that may itself contain gaps.
///
/// A window containing any `None` yields `None`.
pub fn rolling_mean_opt(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(|v| v.is_some()) {
            let sum: f64 = window.iter().map(|v| v.unwrap_or(0.0)).sum();
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

/// Rolling sample standard deviation (ddof = 1).
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period < 2 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (period - 1) as f64;
        out[i] = Some(var.sqrt());
    }
    out
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)`, seeded with the
/// first value: `y[0] = x[0]`, `y[i] = alpha * x[i] + (1 - alpha) * y[i-1]`.
pub fn ewm(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// [`ewm`] over a gapped series.
///
/// Leading `None`s stay `None`; the first defined value seeds the mean; an
/// interior `None` carries the previous smoothed value forward.
pub fn ewm_opt(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;
    for (i, v) in values.iter().enumerate() {
        prev = match (prev, v) {
            (None, None) => None,
            (None, Some(x)) => Some(*x),
            (Some(p), None) => Some(p),
            (Some(p), Some(x)) => Some(alpha * x + (1.0 - alpha) * p),
        };
        out[i] = prev;
    }
    out
}
