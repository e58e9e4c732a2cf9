//! Performance metrics derived from a completed backtest.

use serde::Serialize;

use crate::domain::backtest::{BacktestResult, Trade};

/// Trading-days-per-year factor used to annualize ratios; crypto markets
/// never close.
const PERIODS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapitalMetrics {
    pub initial: f64,
    #[serde(rename = "final")]
    pub final_capital: f64,
    pub total_profit: f64,
    pub pl_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeMetrics {
    pub number_of_trades: usize,
    /// Share of trades with positive net profit, in percent.
    pub win_rate: f64,
    pub avg_trade_duration_hours: f64,
    /// Gross wins over gross losses; infinite when nothing was lost.
    pub profit_factor: f64,
    /// Win-rate-weighted average win minus loss-rate-weighted average loss.
    pub expectancy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeMetrics {
    pub total_fees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    /// Worst dollar dip below the running equity peak; zero or negative.
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyAndHoldMetrics {
    pub final_capital: f64,
    pub profit: f64,
    pub pl_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestMetrics {
    pub capital: CapitalMetrics,
    pub trades: TradeMetrics,
    pub fees: FeeMetrics,
    pub performance: PerformanceMetrics,
    pub buy_and_hold: BuyAndHoldMetrics,
}

/// Per-trade equity curve: the initial capital followed by the running
/// capital after each closed trade.
pub fn equity_curve(result: &BacktestResult) -> Vec<f64> {
    let mut curve = Vec::with_capacity(result.trades.len() + 1);
    curve.push(result.initial_capital);
    let mut equity = result.initial_capital;
    for trade in &result.trades {
        equity += trade.net_profit;
        curve.push(equity);
    }
    curve
}

fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &equity in curve {
        peak = peak.max(equity);
        worst = worst.min(equity - peak);
    }
    worst
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

fn curve_returns(curve: &[f64]) -> Vec<f64> {
    curve
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Annualized mean-over-volatility of the per-trade equity returns. Zero
/// when there are not enough returns or no variance.
fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let std = population_std(returns);
    if std == 0.0 {
        return 0.0;
    }
    mean / std * PERIODS_PER_YEAR.sqrt()
}

/// Like the Sharpe ratio but penalizing only downside: the denominator is
/// the root-mean-square of the negative returns over the whole sample. Zero
/// when every return was a gain.
fn sortino_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let downside_var = returns
        .iter()
        .map(|r| r.min(0.0).powi(2))
        .sum::<f64>()
        / returns.len() as f64;
    let downside = downside_var.sqrt();
    if downside == 0.0 {
        return 0.0;
    }
    mean / downside * PERIODS_PER_YEAR.sqrt()
}

/// `win_rate * avg_win - (1 - win_rate) * avg_loss`. A break-even trade
/// counts against the win rate but not in the average loss.
fn expectancy(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins: Vec<f64> = trades
        .iter()
        .filter(|t| t.net_profit > 0.0)
        .map(|t| t.net_profit)
        .collect();
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| t.net_profit < 0.0)
        .map(|t| -t.net_profit)
        .collect();
    let win_rate = wins.len() as f64 / trades.len() as f64;
    let avg_win = if wins.is_empty() {
        0.0
    } else {
        wins.iter().sum::<f64>() / wins.len() as f64
    };
    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        losses.iter().sum::<f64>() / losses.len() as f64
    };
    win_rate * avg_win - (1.0 - win_rate) * avg_loss
}

fn profit_factor(trades: &[Trade]) -> f64 {
    let wins: f64 = trades
        .iter()
        .filter(|t| t.net_profit > 0.0)
        .map(|t| t.net_profit)
        .sum();
    let losses: f64 = trades
        .iter()
        .filter(|t| t.net_profit < 0.0)
        .map(|t| -t.net_profit)
        .sum();
    if losses > 0.0 {
        wins / losses
    } else if wins > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

pub fn compute_metrics(result: &BacktestResult) -> BacktestMetrics {
    let trades = &result.trades;
    let n = trades.len();
    let total_profit = result.final_capital - result.initial_capital;

    let win_rate = if n > 0 {
        trades.iter().filter(|t| t.net_profit > 0.0).count() as f64 / n as f64 * 100.0
    } else {
        0.0
    };
    let avg_duration = if n > 0 {
        trades.iter().map(Trade::duration_hours).sum::<f64>() / n as f64
    } else {
        0.0
    };
    let total_fees: f64 = trades.iter().map(|t| t.fees).sum();

    let curve = equity_curve(result);
    let returns = curve_returns(&curve);

    // buy and hold over the span the strategy was actually in the market
    let (bh_profit, bh_final) = match (trades.first(), trades.last()) {
        (Some(first), Some(last)) => {
            let shares = result.initial_capital / first.entry_price;
            let profit = (last.exit_price - first.entry_price) * shares;
            (profit, result.initial_capital + profit)
        }
        _ => (0.0, result.initial_capital),
    };

    BacktestMetrics {
        capital: CapitalMetrics {
            initial: result.initial_capital,
            final_capital: result.final_capital,
            total_profit,
            pl_percent: total_profit / result.initial_capital * 100.0,
        },
        trades: TradeMetrics {
            number_of_trades: n,
            win_rate,
            avg_trade_duration_hours: avg_duration,
            profit_factor: profit_factor(trades),
            expectancy: expectancy(trades),
        },
        fees: FeeMetrics { total_fees },
        performance: PerformanceMetrics {
            max_drawdown: max_drawdown(&curve),
            sharpe_ratio: sharpe_ratio(&returns),
            sortino_ratio: sortino_ratio(&returns),
        },
        buy_and_hold: BuyAndHoldMetrics {
            final_capital: bh_final,
            profit: bh_profit,
            pl_percent: bh_profit / result.initial_capital * 100.0,
        },
    }
}
