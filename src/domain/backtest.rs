//! Deterministic bar-by-bar trade simulation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::bar::EnrichedBar;
use crate::domain::config::BacktestParams;
use crate::domain::error::TradewindError;
use crate::domain::signal::{Regime, SignalEngine};

/// One completed round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub sequence_id: u64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: f64,
    pub gross_profit: f64,
    pub fees: f64,
    pub net_profit: f64,
    pub regime: Regime,
}

impl Trade {
    pub fn duration_hours(&self) -> f64 {
        (self.exit_time - self.entry_time).num_seconds() as f64 / 3600.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_capital: f64,
    pub trades: Vec<Trade>,
}

struct OpenPosition {
    sequence_id: u64,
    entry_time: DateTime<Utc>,
    entry_price: f64,
    shares: f64,
    regime: Regime,
}

fn close_position(
    position: OpenPosition,
    exit_time: DateTime<Utc>,
    exit_price: f64,
    params: &BacktestParams,
) -> Trade {
    let gross = (exit_price - position.entry_price) * position.shares;
    let fees = (position.entry_price + exit_price) * position.shares * params.trade_fee;
    Trade {
        sequence_id: position.sequence_id,
        entry_time: position.entry_time,
        exit_time,
        entry_price: position.entry_price,
        exit_price,
        shares: position.shares,
        gross_profit: gross,
        fees,
        net_profit: gross - fees,
        regime: position.regime,
    }
}

/// Replays the enriched series through the signal engine.
///
/// At most one position is open at a time. Entries invest
/// `investment_fraction` of the current capital at the bar close; net profit
/// (after a per-side fee on notional) compounds into capital. A bar that
/// opens a position is never also asked for an exit. Any position still open
/// after the last bar is closed at that bar's price. The last bar's
/// timestamp serves as the evaluation clock, so the whole series is fair
/// game and the run is reproducible.
pub fn run_backtest(
    bars: &[EnrichedBar],
    engine: &mut SignalEngine,
    params: &BacktestParams,
) -> Result<BacktestResult, TradewindError> {
    let last = bars.last().ok_or(TradewindError::EmptyData)?;
    let now = last.timestamp();
    tracing::info!(
        bars = bars.len(),
        capital = params.initial_capital,
        "starting backtest"
    );

    let mut capital = params.initial_capital;
    let mut trades: Vec<Trade> = Vec::new();
    let mut position: Option<OpenPosition> = None;
    let mut next_id: u64 = 0;

    for (i, row) in bars.iter().enumerate() {
        if position.is_none() {
            if engine.entry_signal(bars, i, now) {
                let invested = capital * params.investment_fraction;
                next_id += 1;
                position = Some(OpenPosition {
                    sequence_id: next_id,
                    entry_time: row.timestamp(),
                    entry_price: row.close(),
                    shares: invested / row.close(),
                    regime: engine.regime(),
                });
                continue;
            }
        } else if engine.exit_signal(bars, i, now) {
            if let Some(open) = position.take() {
                let trade = close_position(open, row.timestamp(), row.close(), params);
                capital += trade.net_profit;
                tracing::debug!(
                    entry = %trade.entry_time,
                    exit = %trade.exit_time,
                    net = trade.net_profit,
                    "trade closed"
                );
                trades.push(trade);
            }
        }
    }

    if let Some(open) = position.take() {
        tracing::info!(bar = %now, price = last.close(), "force-closing open position");
        let trade = close_position(open, now, last.close(), params);
        capital += trade.net_profit;
        trades.push(trade);
        engine.close_position();
    }

    tracing::info!(trades = trades.len(), final_capital = capital, "backtest finished");
    Ok(BacktestResult {
        initial_capital: params.initial_capital,
        final_capital: capital,
        trades,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::config::StrategyParams;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn entry_row(hour: u32, close: f64) -> EnrichedBar {
        EnrichedBar {
            bar: Bar {
                timestamp: ts(hour),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 2_000.0,
            },
            sma_short: Some(close),
            sma_long: Some(close - 5.0),
            rsi: Some(55.0),
            macd: Some(1.0),
            macd_signal: Some(0.5),
            atr: Some(2.0),
            atr_sma: Some(1.0),
            adx: Some(30.0),
            volume_sma: Some(1_000.0),
            bollinger_upper: Some(close + 10.0),
            bollinger_mid: Some(close),
            bollinger_lower: Some(close - 10.0),
            supertrend_upper: Some(close + 6.0),
            supertrend_lower: Some(close - 6.0),
            supertrend_up: Some(true),
        }
    }

    fn neutral_row(hour: u32, close: f64) -> EnrichedBar {
        let mut row = entry_row(hour, close);
        row.sma_short = Some(close - 5.0);
        row.sma_long = Some(close);
        row
    }

    fn exit_row(hour: u32, close: f64) -> EnrichedBar {
        let mut row = neutral_row(hour, close);
        row.macd = Some(-1.0);
        row.macd_signal = Some(0.0);
        row
    }

    #[test]
    fn empty_series_is_an_error() {
        let mut engine = SignalEngine::new(StrategyParams::default());
        let err = run_backtest(&[], &mut engine, &BacktestParams::default()).unwrap_err();
        assert!(matches!(err, TradewindError::EmptyData));
    }

    #[test]
    fn single_round_trip_accounting() {
        let bars = vec![
            entry_row(0, 100.0),
            entry_row(1, 100.0),
            neutral_row(2, 110.0),
            exit_row(3, 110.0),
        ];
        let mut engine = SignalEngine::new(StrategyParams {
            trailing_stop_percentage: 0.99,
            time_based_stop_days: 0,
            ..StrategyParams::default()
        });
        let params = BacktestParams {
            initial_capital: 10_000.0,
            trade_fee: 0.001,
            investment_fraction: 1.0,
        };
        let result = run_backtest(&bars, &mut engine, &params).unwrap();
        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_time, ts(1));
        assert_eq!(trade.exit_time, ts(3));
        assert!((trade.shares - 100.0).abs() < 1e-9);
        assert!((trade.gross_profit - 1_000.0).abs() < 1e-9);
        // (100 + 110) * 100 * 0.001 = 21
        assert!((trade.fees - 21.0).abs() < 1e-9);
        assert!((trade.net_profit - 979.0).abs() < 1e-9);
        assert!((result.final_capital - 10_979.0).abs() < 1e-9);
    }

    #[test]
    fn open_position_is_forced_closed() {
        let bars = vec![
            entry_row(0, 100.0),
            entry_row(1, 100.0),
            neutral_row(2, 105.0),
        ];
        let mut engine = SignalEngine::new(StrategyParams {
            trailing_stop_percentage: 0.99,
            time_based_stop_days: 0,
            ..StrategyParams::default()
        });
        let result =
            run_backtest(&bars, &mut engine, &BacktestParams::default()).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_time, ts(2));
        assert!(!engine.is_open());
    }

    #[test]
    fn entry_on_last_bar_is_closed_at_that_bar() {
        let bars = vec![entry_row(0, 100.0), entry_row(1, 100.0)];
        let mut engine = SignalEngine::new(StrategyParams::default());
        let result =
            run_backtest(&bars, &mut engine, &BacktestParams::default()).unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_time, ts(1));
        assert_eq!(result.trades[0].exit_time, ts(1));
        assert!(!engine.is_open());
    }

    #[test]
    fn capital_compounds_across_trades() {
        let bars = vec![
            entry_row(0, 100.0),
            entry_row(1, 100.0),
            exit_row(2, 110.0),
            entry_row(3, 100.0),
            entry_row(4, 100.0),
            exit_row(5, 110.0),
        ];
        let mut engine = SignalEngine::new(StrategyParams {
            trailing_stop_percentage: 0.99,
            time_based_stop_days: 0,
            ..StrategyParams::default()
        });
        let params = BacktestParams {
            initial_capital: 10_000.0,
            trade_fee: 0.0,
            investment_fraction: 1.0,
        };
        let result = run_backtest(&bars, &mut engine, &params).unwrap();
        assert_eq!(result.trades.len(), 2);
        // 10% per trade, fully reinvested
        assert!((result.final_capital - 12_100.0).abs() < 1e-9);
        assert!(result.trades[1].shares > result.trades[0].shares);
        assert_eq!(result.trades[0].sequence_id, 1);
        assert_eq!(result.trades[1].sequence_id, 2);
    }

    #[test]
    fn identical_runs_are_identical() {
        let bars = vec![
            entry_row(0, 100.0),
            entry_row(1, 100.0),
            neutral_row(2, 104.0),
            exit_row(3, 108.0),
            entry_row(4, 100.0),
            entry_row(5, 101.0),
        ];
        let params = BacktestParams::default();
        let strategy = StrategyParams {
            trailing_stop_percentage: 0.99,
            time_based_stop_days: 0,
            ..StrategyParams::default()
        };
        let mut first_engine = SignalEngine::new(strategy.clone());
        let mut second_engine = SignalEngine::new(strategy);
        let first = run_backtest(&bars, &mut first_engine, &params).unwrap();
        let second = run_backtest(&bars, &mut second_engine, &params).unwrap();
        assert_eq!(first, second);
    }
}
