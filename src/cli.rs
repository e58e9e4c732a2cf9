//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::run_backtest;
use crate::domain::config::{BacktestParams, StrategyParams};
use crate::domain::enrich::compute_enriched;
use crate::domain::error::TradewindError;
use crate::domain::metrics::compute_metrics;
use crate::domain::signal::SignalEngine;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradewind", about = "Regime-switching trading-rule backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding <symbol>.csv files
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate config and data wiring without running
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for a symbol
    Info {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        symbol: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            symbol,
            output,
            dry_run,
        } => run_backtest_command(&config, &data, &symbol, output.as_ref(), dry_run),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data, symbol } => run_info(&data, &symbol),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn load_params(
    adapter: &FileConfigAdapter,
) -> Result<(StrategyParams, BacktestParams), TradewindError> {
    let strategy = StrategyParams::from_config(adapter)?;
    strategy.validate()?;
    let backtest = BacktestParams::from_config(adapter)?;
    backtest.validate()?;
    Ok((strategy, backtest))
}

fn run_backtest_command(
    config_path: &PathBuf,
    data_path: &PathBuf,
    symbol: &str,
    output_path: Option<&PathBuf>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let (strategy_params, backtest_params) = match load_params(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: Load bars
    eprintln!("Loading bars for {} from {}", symbol, data_path.display());
    let data_port = CsvAdapter::new(data_path.clone());
    let bars = match data_port.fetch_bars(symbol) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} bars loaded", bars.len());

    if dry_run {
        eprintln!("Dry run: config and data OK, stopping before simulation");
        return ExitCode::SUCCESS;
    }

    // Stage 3: Compute indicators
    let enriched = compute_enriched(&bars, &strategy_params);
    if enriched.is_empty() {
        let e = TradewindError::InsufficientData {
            bars: bars.len(),
            minimum: strategy_params.max_lookback(),
        };
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("  {} bars after indicator warmup", enriched.len());

    // Stage 4: Run the simulation
    let mut engine = SignalEngine::new(strategy_params);
    let result = match run_backtest(&enriched, &mut engine, &backtest_params) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Compute metrics and print console summary
    let metrics = compute_metrics(&result);
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Initial Capital:  {:.2}", metrics.capital.initial);
    eprintln!("Final Capital:    {:.2}", metrics.capital.final_capital);
    eprintln!("P/L:              {:.2}%", metrics.capital.pl_percent);
    eprintln!("Total Trades:     {}", metrics.trades.number_of_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.trades.win_rate);
    eprintln!("Profit Factor:    {:.2}", metrics.trades.profit_factor);
    eprintln!("Max Drawdown:     {:.2}", metrics.performance.max_drawdown);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.performance.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.performance.sortino_ratio);
    eprintln!(
        "Buy & Hold P/L:   {:.2}%",
        metrics.buy_and_hold.pl_percent
    );

    // Stage 6: Write report
    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("results"));
    match JsonReportAdapter::new().write(&result, &metrics, &output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match load_params(&adapter) {
        Ok((strategy, _)) => {
            eprintln!(
                "Configuration OK ({} bar minimum lookback)",
                strategy.max_lookback()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(data_path: &PathBuf, symbol: &str) -> ExitCode {
    let data_port = CsvAdapter::new(data_path.clone());
    match data_port.data_range(symbol) {
        Ok(Some((start, end, count))) => {
            eprintln!("{}: {} bars, {} to {}", symbol, count, start, end);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no bars", symbol);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
