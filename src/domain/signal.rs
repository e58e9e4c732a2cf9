//! Stateful entry/exit signal engine.
//!
//! The engine classifies each bar into a trend or range regime via ADX and
//! applies a different rule set per regime. Position state (entry price,
//! entry time, trailing high, regime) lives here; the backtester only asks
//! "enter?" / "exit?" per bar. A missing indicator value fails the condition
//! that needs it rather than the whole evaluation.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::bar::EnrichedBar;
use crate::domain::config::StrategyParams;

/// Market regime frozen at entry time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Trend,
    Range,
}

/// Extra cushion applied on top of the configured support margin when buying
/// near the lower Bollinger band.
const SUPPORT_CUSHION: f64 = 1.02;
/// Volume must clear this multiple of its SMA for a range entry.
const RANGE_VOLUME_FACTOR: f64 = 1.5;
/// Volume must clear this multiple of its SMA for a trend entry.
const TREND_VOLUME_FACTOR: f64 = 1.2;
/// Range entries are skipped below this RSI to avoid catching a falling knife.
const RSI_OVERSOLD_FLOOR: f64 = 20.0;
/// How many of the five secondary trend conditions must hold.
const SECONDARY_REQUIRED: usize = 3;

#[derive(Debug)]
pub struct SignalEngine {
    params: StrategyParams,
    position_open: bool,
    entry_price: Option<f64>,
    entry_time: Option<DateTime<Utc>>,
    highest_price: Option<f64>,
    range_trading: bool,
    last_entry_fired: Option<DateTime<Utc>>,
    last_exit_fired: Option<DateTime<Utc>>,
}

impl SignalEngine {
    pub fn new(params: StrategyParams) -> Self {
        SignalEngine {
            params,
            position_open: false,
            entry_price: None,
            entry_time: None,
            highest_price: None,
            range_trading: false,
            last_entry_fired: None,
            last_exit_fired: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.position_open
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.entry_price
    }

    pub fn entry_time(&self) -> Option<DateTime<Utc>> {
        self.entry_time
    }

    /// Regime the current position was opened under.
    pub fn regime(&self) -> Regime {
        if self.range_trading {
            Regime::Range
        } else {
            Regime::Trend
        }
    }

    /// Clears all position state, e.g. after a forced close.
    pub fn close_position(&mut self) {
        self.position_open = false;
        self.entry_price = None;
        self.entry_time = None;
        self.highest_price = None;
        self.range_trading = false;
    }

    /// Evaluates the entry rules at `bars[idx]`. On `true` the engine opens
    /// the position and records entry price/time and the active regime.
    ///
    /// `now` is the evaluation clock; bars stamped after it are never acted
    /// on. The first bar cannot fire because the SMA alignment rule needs a
    /// predecessor.
    pub fn entry_signal(
        &mut self,
        bars: &[EnrichedBar],
        idx: usize,
        now: DateTime<Utc>,
    ) -> bool {
        let row = match bars.get(idx) {
            Some(row) => row,
            None => return false,
        };
        let ts = row.timestamp();
        if ts > now {
            tracing::warn!(bar = %ts, clock = %now, "refusing to evaluate future bar");
            return false;
        }
        if self.position_open || self.last_entry_fired == Some(ts) || idx < 1 {
            return false;
        }
        let prev = &bars[idx - 1];

        let lateral_market = row
            .adx
            .is_some_and(|adx| adx < self.params.lateral_adx_threshold);

        let signal = if lateral_market {
            let buy_near_support = match row.bollinger_lower {
                Some(lower) => {
                    row.close() < lower * self.params.support_margin * SUPPORT_CUSHION
                }
                None => false,
            };
            let volume_confirmation = row
                .volume_sma
                .is_some_and(|sma| row.volume() > RANGE_VOLUME_FACTOR * sma);
            let rsi_not_oversold = row.rsi.is_some_and(|rsi| rsi > RSI_OVERSOLD_FLOOR);
            let fired = buy_near_support && volume_confirmation && rsi_not_oversold;
            self.range_trading = fired;
            fired
        } else {
            self.range_trading = false;
            let sma_aligned = match (row.sma_short, row.sma_long, prev.sma_short, prev.sma_long)
            {
                (Some(s), Some(l), Some(ps), Some(pl)) => s > l && ps > pl,
                _ => false,
            };
            let macd_above_signal = match (row.macd, row.macd_signal) {
                (Some(m), Some(s)) => m > s - self.params.macd_threshold,
                _ => false,
            };
            let rsi_below_threshold =
                row.rsi.is_some_and(|rsi| rsi < self.params.rsi_threshold);

            let volume_above_sma = row
                .volume_sma
                .is_some_and(|sma| row.volume() > TREND_VOLUME_FACTOR * sma);
            let supertrend_up =
                !self.params.use_supertrend || row.supertrend_up == Some(true);
            let adx_trending = !self.params.use_adx_positive
                || row.adx.is_some_and(|adx| adx > self.params.adx_threshold);
            let macd_positive =
                !self.params.use_macd_positive || row.macd.is_some_and(|m| m > 0.0);
            let volatility_expanding = match (row.atr, row.atr_sma) {
                (Some(atr), Some(sma)) => atr > sma,
                _ => false,
            };

            let secondary_passed = [
                volume_above_sma,
                supertrend_up,
                adx_trending,
                macd_positive,
                volatility_expanding,
            ]
            .into_iter()
            .filter(|&c| c)
            .count();

            sma_aligned
                && macd_above_signal
                && rsi_below_threshold
                && secondary_passed >= SECONDARY_REQUIRED
        };

        if signal {
            self.position_open = true;
            self.entry_price = Some(row.close());
            self.entry_time = Some(ts);
            self.highest_price = Some(row.close());
            self.last_entry_fired = Some(ts);
            tracing::debug!(bar = %ts, regime = ?self.regime(), price = row.close(), "entry signal");
        }
        signal
    }

    /// Evaluates the exit rules at `bars[idx]`. On `true` the engine clears
    /// its position state.
    ///
    /// Never fires on the entry bar itself. Range positions only exit near
    /// the upper Bollinger band; trend positions exit on MACD cross-down,
    /// trailing stop, ATR stop-loss, take-profit, supertrend flip, or the
    /// time-based stop for young losing positions.
    pub fn exit_signal(
        &mut self,
        bars: &[EnrichedBar],
        idx: usize,
        now: DateTime<Utc>,
    ) -> bool {
        let row = match bars.get(idx) {
            Some(row) => row,
            None => return false,
        };
        let ts = row.timestamp();
        if ts > now {
            tracing::warn!(bar = %ts, clock = %now, "refusing to evaluate future bar");
            return false;
        }
        if !self.position_open
            || self.last_exit_fired == Some(ts)
            || self.entry_time == Some(ts)
        {
            return false;
        }
        let (entry_price, entry_time) = match (self.entry_price, self.entry_time) {
            (Some(p), Some(t)) => (p, t),
            _ => return false,
        };

        let close = row.close();
        let highest = self.highest_price.map_or(close, |h| h.max(close));
        self.highest_price = Some(highest);
        let trailing_stop = highest * (1.0 - self.params.trailing_stop_percentage);

        let signal = if self.range_trading {
            row.bollinger_upper
                .is_some_and(|upper| close > upper * self.params.resistance_margin)
        } else {
            let macd_cross_down = match (row.macd, row.macd_signal) {
                (Some(m), Some(s)) => m < s - self.params.macd_threshold,
                _ => false,
            };
            let (stop_loss_hit, take_profit_hit) = match row.atr {
                Some(atr) => {
                    let stop = entry_price
                        - self.params.stop_loss_atr_multiplier
                            * atr
                            * self.params.stop_loss_multiplier;
                    let take = entry_price
                        + self.params.stop_loss_atr_multiplier
                            * atr
                            * self.params.take_profit_multiplier;
                    (close < stop, close > take)
                }
                None => (false, false),
            };
            let supertrend_flipped =
                self.params.use_supertrend && row.supertrend_up == Some(false);
            let age = ts - entry_time;
            let profit_percent = (close - entry_price) / entry_price * 100.0;
            let time_stop = age < Duration::days(self.params.time_based_stop_days)
                && profit_percent < self.params.time_based_stop_loss_percent;

            macd_cross_down
                || close < trailing_stop
                || stop_loss_hit
                || take_profit_hit
                || supertrend_flipped
                || time_stop
        };

        if signal {
            tracing::debug!(bar = %ts, price = close, "exit signal");
            self.last_exit_fired = Some(ts);
            self.close_position();
        }
        signal
    }
}
