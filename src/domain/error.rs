//! Domain error types.

/// Top-level error type for tradewind.
#[derive(Debug, thiserror::Error)]
pub enum TradewindError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("bar sequence is empty")]
    EmptyData,

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradewindError> for std::process::ExitCode {
    fn from(err: &TradewindError) -> Self {
        let code: u8 = match err {
            TradewindError::Io(_) => 1,
            TradewindError::ConfigParse { .. }
            | TradewindError::ConfigMissing { .. }
            | TradewindError::ConfigInvalid { .. } => 2,
            TradewindError::Data { .. } => 3,
            TradewindError::EmptyData | TradewindError::InsufficientData { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
