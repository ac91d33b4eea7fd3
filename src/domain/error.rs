//! Domain error types.
//!
//! The signal components never fail; these errors come from ingestion,
//! configuration, caller-side input validation and the holdings ledger.

/// Top-level error type for tradeassist.
#[derive(Debug, thiserror::Error)]
pub enum TradeAssistError {
    #[error("data load error: {reason}")]
    DataLoad { reason: String },

    #[error("data parse error in {file}: {reason}")]
    DataParse { file: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("invalid sentiment score {score}: must be a finite value in [-1, 1]")]
    InvalidSentiment { score: f64 },

    #[error("invalid risk profile {value:?}: expected Conservative, Moderate or Aggressive")]
    InvalidProfile { value: String },

    #[error("invalid horizon {days}: must be between 1 and {max} days")]
    InvalidHorizon { days: usize, max: usize },

    #[error("invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    #[error("insufficient holdings of {symbol}: have {held}, requested {requested}")]
    InsufficientHoldings {
        symbol: String,
        held: u64,
        requested: u64,
    },

    #[error("ledger error: {reason}")]
    Ledger { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradeAssistError> for std::process::ExitCode {
    fn from(err: &TradeAssistError) -> Self {
        let code: u8 = match err {
            TradeAssistError::Io(_) => 1,
            TradeAssistError::ConfigParse { .. }
            | TradeAssistError::ConfigInvalid { .. } => 2,
            TradeAssistError::DataLoad { .. }
            | TradeAssistError::DataParse { .. }
            | TradeAssistError::UnknownSymbol { .. } => 3,
            TradeAssistError::InvalidSentiment { .. }
            | TradeAssistError::InvalidProfile { .. }
            | TradeAssistError::InvalidHorizon { .. }
            | TradeAssistError::InvalidTransaction { .. }
            | TradeAssistError::InsufficientHoldings { .. } => 4,
            TradeAssistError::Ledger { .. } | TradeAssistError::Json(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
