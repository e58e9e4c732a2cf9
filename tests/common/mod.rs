#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tradewind::domain::bar::Bar;
use tradewind::domain::config::{BacktestParams, StrategyParams};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Hourly bars with a one-unit range around each close and constant volume.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start_time() + Duration::hours(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
        })
        .collect()
}

/// Short lookbacks so indicators warm up within a few bars.
pub fn small_params() -> StrategyParams {
    StrategyParams {
        sma_short: 2,
        sma_long: 3,
        rsi_period: 2,
        macd_fast: 2,
        macd_slow: 4,
        macd_signal: 2,
        atr_period: 3,
        adx_period: 3,
        bollinger_period: 3,
        volume_sma_period: 3,
        ..StrategyParams::default()
    }
}

/// [`small_params`] tuned so the trend rules alone drive entries and the
/// MACD cross-down (or the forced close) is the only possible exit.
pub fn trend_only_params() -> StrategyParams {
    StrategyParams {
        lateral_adx_threshold: 0.0,
        rsi_threshold: 101.0,
        stop_loss_atr_multiplier: 1_000.0,
        take_profit_multiplier: 1_000.0,
        trailing_stop_percentage: 0.99,
        time_based_stop_days: 0,
        ..small_params()
    }
}

pub fn bt_params() -> BacktestParams {
    BacktestParams {
        initial_capital: 10_000.0,
        trade_fee: 0.001,
        investment_fraction: 1.0,
    }
}
