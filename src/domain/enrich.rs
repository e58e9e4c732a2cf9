//! Builds the enriched bar series consumed by the signal engine.

use crate::domain::bar::{Bar, EnrichedBar};
use crate::domain::config::StrategyParams;
use crate::domain::indicator::adx::calculate_adx;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::supertrend::calculate_supertrend;
use crate::domain::indicator::{rolling_mean, rolling_mean_opt};

/// Trailing rows kept even when some indicators are still undefined, so the
/// most recent bars always survive enrichment.
const TAIL_KEEP: usize = 5;

/// Computes every indicator column and returns the decision-ready series.
///
/// Warmup rows with missing values are dropped, except for the last
/// [`TAIL_KEEP`] bars: those are kept and forward-filled from their
/// predecessors within the tail, so a fresh bar is never lost to a gap in a
/// slow indicator. Returns an empty series (with a warning) when there are
/// fewer bars than the longest lookback.
pub fn compute_enriched(bars: &[Bar], params: &StrategyParams) -> Vec<EnrichedBar> {
    let minimum = params.max_lookback();
    if bars.len() < minimum {
        tracing::warn!(
            bars = bars.len(),
            minimum,
            "not enough bars to warm up indicators"
        );
        return Vec::new();
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let sma_short = rolling_mean(&closes, params.sma_short);
    let sma_long = rolling_mean(&closes, params.sma_long);
    let rsi = calculate_rsi(bars, params.rsi_period);
    let (macd, macd_signal) =
        calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal);
    let atr = calculate_atr(bars, params.atr_period);
    let atr_sma = rolling_mean_opt(&atr, params.atr_period);
    let adx = calculate_adx(bars, params.adx_period);
    let volume_sma = rolling_mean(&volumes, params.volume_sma_period);
    let bands = calculate_bollinger(bars, params.bollinger_period, params.bollinger_std_dev);
    let st = calculate_supertrend(bars, params.atr_period, params.supertrend_multiplier);

    let mut enriched: Vec<EnrichedBar> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| EnrichedBar {
            bar: bar.clone(),
            sma_short: sma_short[i],
            sma_long: sma_long[i],
            rsi: rsi[i],
            macd: Some(macd[i]),
            macd_signal: Some(macd_signal[i]),
            atr: atr[i],
            atr_sma: atr_sma[i],
            adx: adx[i],
            volume_sma: volume_sma[i],
            bollinger_upper: bands.upper[i],
            bollinger_mid: bands.mid[i],
            bollinger_lower: bands.lower[i],
            supertrend_upper: st.upper[i],
            supertrend_lower: st.lower[i],
            supertrend_up: st.up[i],
        })
        .collect();

    let tail_start = enriched.len().saturating_sub(TAIL_KEEP);
    let tail = enriched.split_off(tail_start);
    enriched.retain(EnrichedBar::indicators_ready);
    enriched.extend(forward_fill(tail));
    enriched
}

/// Forward-fills missing indicator values within a run of bars. Each field
/// carries the last defined value from an earlier bar in the same run.
fn forward_fill(mut rows: Vec<EnrichedBar>) -> Vec<EnrichedBar> {
    for i in 1..rows.len() {
        let (head, rest) = rows.split_at_mut(i);
        let prev = &head[i - 1];
        let row = &mut rest[0];
        row.sma_short = row.sma_short.or(prev.sma_short);
        row.sma_long = row.sma_long.or(prev.sma_long);
        row.rsi = row.rsi.or(prev.rsi);
        row.macd = row.macd.or(prev.macd);
        row.macd_signal = row.macd_signal.or(prev.macd_signal);
        row.atr = row.atr.or(prev.atr);
        row.atr_sma = row.atr_sma.or(prev.atr_sma);
        row.adx = row.adx.or(prev.adx);
        row.volume_sma = row.volume_sma.or(prev.volume_sma);
        row.bollinger_upper = row.bollinger_upper.or(prev.bollinger_upper);
        row.bollinger_mid = row.bollinger_mid.or(prev.bollinger_mid);
        row.bollinger_lower = row.bollinger_lower.or(prev.bollinger_lower);
        row.supertrend_upper = row.supertrend_upper.or(prev.supertrend_upper);
        row.supertrend_lower = row.supertrend_lower.or(prev.supertrend_lower);
        row.supertrend_up = row.supertrend_up.or(prev.supertrend_up);
    }
    rows
}
