//! Strategy and backtest parameters, loaded through a [`ConfigPort`].

use crate::domain::error::TradewindError;
use crate::ports::config_port::ConfigPort;

/// Everything the indicator and signal engines need to run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    // Moving averages
    pub sma_short: usize,
    pub sma_long: usize,
    // RSI
    pub rsi_period: usize,
    pub rsi_threshold: f64,
    // MACD
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub macd_threshold: f64,
    // ATR / ADX
    pub atr_period: usize,
    pub adx_period: usize,
    pub adx_threshold: f64,
    pub lateral_adx_threshold: f64,
    // Bollinger bands
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    // Volume
    pub volume_sma_period: usize,
    // Supertrend
    pub supertrend_multiplier: f64,
    // Secondary-condition toggles
    pub use_supertrend: bool,
    pub use_adx_positive: bool,
    pub use_macd_positive: bool,
    // Exits
    pub stop_loss_atr_multiplier: f64,
    pub stop_loss_multiplier: f64,
    pub take_profit_multiplier: f64,
    pub trailing_stop_percentage: f64,
    pub time_based_stop_days: i64,
    pub time_based_stop_loss_percent: f64,
    // Support / resistance cushions (percent)
    pub resistance_margin: f64,
    pub support_margin: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            sma_short: 10,
            sma_long: 50,
            rsi_period: 14,
            rsi_threshold: 70.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            macd_threshold: 0.0,
            atr_period: 14,
            adx_period: 14,
            adx_threshold: 25.0,
            lateral_adx_threshold: 20.0,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            volume_sma_period: 20,
            supertrend_multiplier: 3.0,
            use_supertrend: false,
            use_adx_positive: false,
            use_macd_positive: false,
            stop_loss_atr_multiplier: 1.5,
            stop_loss_multiplier: 1.0,
            take_profit_multiplier: 5.0,
            trailing_stop_percentage: 0.05,
            time_based_stop_days: 7,
            time_based_stop_loss_percent: -2.0,
            resistance_margin: 1.0,
            support_margin: 1.0,
        }
    }
}

impl StrategyParams {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradewindError> {
        Ok(StrategyParams {
            sma_short: get_usize(config, "strategy", "sma_short")?,
            sma_long: get_usize(config, "strategy", "sma_long")?,
            rsi_period: get_usize(config, "strategy", "rsi_period")?,
            rsi_threshold: get_f64(config, "strategy", "rsi_threshold")?,
            macd_fast: get_usize(config, "strategy", "macd_fast")?,
            macd_slow: get_usize(config, "strategy", "macd_slow")?,
            macd_signal: get_usize(config, "strategy", "macd_signal")?,
            macd_threshold: get_f64(config, "strategy", "macd_threshold")?,
            atr_period: get_usize(config, "strategy", "atr_period")?,
            adx_period: get_usize(config, "strategy", "adx_period")?,
            adx_threshold: get_f64(config, "strategy", "adx_threshold")?,
            lateral_adx_threshold: get_f64(config, "strategy", "lateral_adx_threshold")?,
            bollinger_period: get_usize(config, "strategy", "bollinger_period")?,
            bollinger_std_dev: get_f64(config, "strategy", "bollinger_std_dev")?,
            volume_sma_period: get_usize(config, "strategy", "volume_sma_period")?,
            supertrend_multiplier: get_f64(config, "strategy", "supertrend_multiplier")?,
            use_supertrend: get_bool(config, "strategy", "use_supertrend")?,
            use_adx_positive: get_bool(config, "strategy", "use_adx_positive")?,
            use_macd_positive: get_bool(config, "strategy", "use_macd_positive")?,
            stop_loss_atr_multiplier: get_f64(config, "strategy", "stop_loss_atr_multiplier")?,
            stop_loss_multiplier: get_f64(config, "strategy", "stop_loss_multiplier")?,
            take_profit_multiplier: get_f64(config, "strategy", "take_profit_multiplier")?,
            trailing_stop_percentage: get_f64(config, "strategy", "trailing_stop_percentage")?,
            time_based_stop_days: get_i64(config, "strategy", "time_based_stop_days")?,
            time_based_stop_loss_percent: get_f64(
                config,
                "strategy",
                "time_based_stop_loss_percent",
            )?,
            resistance_margin: get_f64(config, "strategy", "resistance_margin")?,
            support_margin: get_f64(config, "strategy", "support_margin")?,
        })
    }

    pub fn validate(&self) -> Result<(), TradewindError> {
        let positive_periods: [(&str, usize); 8] = [
            ("sma_short", self.sma_short),
            ("sma_long", self.sma_long),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("atr_period", self.atr_period),
            ("volume_sma_period", self.volume_sma_period),
        ];
        for (key, value) in positive_periods {
            if value == 0 {
                return Err(invalid("strategy", key, "must be at least 1"));
            }
        }
        if self.adx_period < 2 {
            return Err(invalid("strategy", "adx_period", "must be at least 2"));
        }
        if self.bollinger_period < 2 {
            return Err(invalid("strategy", "bollinger_period", "must be at least 2"));
        }
        if self.sma_short >= self.sma_long {
            return Err(invalid(
                "strategy",
                "sma_short",
                "must be smaller than sma_long",
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(invalid(
                "strategy",
                "macd_fast",
                "must be smaller than macd_slow",
            ));
        }
        if self.bollinger_std_dev <= 0.0 {
            return Err(invalid("strategy", "bollinger_std_dev", "must be positive"));
        }
        if self.supertrend_multiplier <= 0.0 {
            return Err(invalid(
                "strategy",
                "supertrend_multiplier",
                "must be positive",
            ));
        }
        if !(0.0..1.0).contains(&self.trailing_stop_percentage) {
            return Err(invalid(
                "strategy",
                "trailing_stop_percentage",
                "must be in [0, 1)",
            ));
        }
        if self.time_based_stop_days < 0 {
            return Err(invalid(
                "strategy",
                "time_based_stop_days",
                "must not be negative",
            ));
        }
        Ok(())
    }

    /// Longest lookback any indicator needs before it can produce a value.
    pub fn max_lookback(&self) -> usize {
        [
            self.sma_long,
            self.rsi_period,
            self.macd_slow,
            self.atr_period,
            self.adx_period,
            self.bollinger_period,
            self.volume_sma_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Capital and cost model for a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestParams {
    pub initial_capital: f64,
    pub trade_fee: f64,
    pub investment_fraction: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        BacktestParams {
            initial_capital: 10_000.0,
            trade_fee: 0.001,
            investment_fraction: 1.0,
        }
    }
}

impl BacktestParams {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradewindError> {
        Ok(BacktestParams {
            initial_capital: get_f64(config, "backtest", "initial_capital")?,
            trade_fee: get_f64(config, "backtest", "trade_fee")?,
            investment_fraction: get_f64(config, "backtest", "investment_fraction")?,
        })
    }

    pub fn validate(&self) -> Result<(), TradewindError> {
        if self.initial_capital <= 0.0 {
            return Err(invalid("backtest", "initial_capital", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.trade_fee) {
            return Err(invalid("backtest", "trade_fee", "must be in [0, 1)"));
        }
        if !(self.investment_fraction > 0.0 && self.investment_fraction <= 1.0) {
            return Err(invalid(
                "backtest",
                "investment_fraction",
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> TradewindError {
    TradewindError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn get_raw(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, TradewindError> {
    config
        .get_string(section, key)
        .ok_or_else(|| TradewindError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn get_usize(config: &dyn ConfigPort, section: &str, key: &str) -> Result<usize, TradewindError> {
    let raw = get_raw(config, section, key)?;
    raw.trim()
        .parse::<usize>()
        .map_err(|_| invalid(section, key, "expected a non-negative integer"))
}

fn get_i64(config: &dyn ConfigPort, section: &str, key: &str) -> Result<i64, TradewindError> {
    let raw = get_raw(config, section, key)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| invalid(section, key, "expected an integer"))
}

fn get_f64(config: &dyn ConfigPort, section: &str, key: &str) -> Result<f64, TradewindError> {
    let raw = get_raw(config, section, key)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| invalid(section, key, "expected a number"))
}

fn get_bool(config: &dyn ConfigPort, section: &str, key: &str) -> Result<bool, TradewindError> {
    let raw = get_raw(config, section, key)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(invalid(section, key, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn sample_config() -> FileConfigAdapter {
        FileConfigAdapter::from_string(
            r#"
[strategy]
sma_short = 10
sma_long = 50
rsi_period = 14
rsi_threshold = 70
macd_fast = 12
macd_slow = 26
macd_signal = 9
macd_threshold = 0.0
atr_period = 14
adx_period = 14
adx_threshold = 25
lateral_adx_threshold = 20
bollinger_period = 20
bollinger_std_dev = 2.0
volume_sma_period = 20
supertrend_multiplier = 3.0
use_supertrend = true
use_adx_positive = false
use_macd_positive = true
stop_loss_atr_multiplier = 1.5
stop_loss_multiplier = 1.0
take_profit_multiplier = 5.0
trailing_stop_percentage = 0.05
time_based_stop_days = 7
time_based_stop_loss_percent = -2.0
resistance_margin = 1.0
support_margin = 1.0

[backtest]
initial_capital = 10000
trade_fee = 0.001
investment_fraction = 1.0
"#,
        )
        .unwrap()
    }

    #[test]
    fn loads_strategy_params() {
        let params = StrategyParams::from_config(&sample_config()).unwrap();
        assert_eq!(params.sma_short, 10);
        assert_eq!(params.sma_long, 50);
        assert!((params.rsi_threshold - 70.0).abs() < f64::EPSILON);
        assert!(params.use_supertrend);
        assert!(!params.use_adx_positive);
        assert!(params.use_macd_positive);
        assert_eq!(params.time_based_stop_days, 7);
        assert!((params.time_based_stop_loss_percent + 2.0).abs() < f64::EPSILON);
        params.validate().unwrap();
    }

    #[test]
    fn loads_backtest_params() {
        let params = BacktestParams::from_config(&sample_config()).unwrap();
        assert!((params.initial_capital - 10_000.0).abs() < f64::EPSILON);
        assert!((params.trade_fee - 0.001).abs() < f64::EPSILON);
        params.validate().unwrap();
    }

    #[test]
    fn missing_key_is_reported() {
        let config = FileConfigAdapter::from_string("[strategy]\nsma_short = 10\n").unwrap();
        let err = StrategyParams::from_config(&config).unwrap_err();
        match err {
            TradewindError::ConfigMissing { section, key } => {
                assert_eq!(section, "strategy");
                assert_eq!(key, "sma_long");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_number_is_invalid() {
        let config =
            FileConfigAdapter::from_string("[strategy]\nsma_short = ten\nsma_long = 50\n").unwrap();
        let err = StrategyParams::from_config(&config).unwrap_err();
        assert!(matches!(err, TradewindError::ConfigInvalid { .. }));
    }

    #[test]
    fn validate_rejects_inverted_smas() {
        let params = StrategyParams {
            sma_short: 50,
            sma_long: 10,
            ..StrategyParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn validate_rejects_tiny_bollinger() {
        let params = StrategyParams {
            bollinger_period: 1,
            ..StrategyParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_fraction() {
        let params = BacktestParams {
            investment_fraction: 0.0,
            ..BacktestParams::default()
        };
        assert!(params.validate().is_err());
        let params = BacktestParams {
            trade_fee: 1.0,
            ..BacktestParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn max_lookback_takes_largest_period() {
        let params = StrategyParams::default();
        assert_eq!(params.max_lookback(), 50);
        let params = StrategyParams {
            bollinger_period: 120,
            ..StrategyParams::default()
        };
        assert_eq!(params.max_lookback(), 120);
    }
}
