//! Domain error types.

/// Top-level error type for daytrader.
#[derive(Debug, thiserror::Error)]
pub enum DaytraderError {
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

    #[error("{service} call failed: {reason}")]
    ExternalService { service: String, reason: String },

    #[error("no instrument for {symbol} on {exchange}")]
    UnknownInstrument { symbol: String, exchange: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("strategy '{name}' not found")]
    UnknownStrategy { name: String },

    #[error("a trade is already active")]
    TradeActive,

    #[error("day setup aborted: {reason}")]
    SetupAborted { reason: String },

    #[error("trade log error: {reason}")]
    TradeLog { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DaytraderError {
    pub fn external(service: &str, reason: impl Into<String>) -> DaytraderError {
        DaytraderError::ExternalService {
            service: service.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&DaytraderError> for std::process::ExitCode {
    fn from(err: &DaytraderError) -> Self {
        let code: u8 = match err {
            DaytraderError::Io(_) => 1,
            DaytraderError::ConfigParse { .. }
            | DaytraderError::ConfigMissing { .. }
            | DaytraderError::ConfigInvalid { .. } => 2,
            DaytraderError::ExternalService { .. } | DaytraderError::TradeLog { .. } => 3,
            DaytraderError::UnknownInstrument { .. } | DaytraderError::UnknownStrategy { .. } => 4,
            DaytraderError::InsufficientData { .. }
            | DaytraderError::SetupAborted { .. }
            | DaytraderError::TradeActive => 5,
        };
        std::process::ExitCode::from(code)
    }
}
