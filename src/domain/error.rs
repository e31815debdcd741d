//! Domain error types.

/// Top-level error type for stockdeck.
#[derive(Debug, thiserror::Error)]
pub enum StockdeckError {
    #[error("provider error: {reason}")]
    Provider { reason: String },

    #[error("provider rate limited: {reason}")]
    RateLimited { reason: String },

    #[error("cache error: {reason}")]
    Cache { reason: String },

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

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockdeckError> for std::process::ExitCode {
    fn from(err: &StockdeckError) -> Self {
        let code: u8 = match err {
            StockdeckError::Io(_) => 1,
            StockdeckError::ConfigParse { .. }
            | StockdeckError::ConfigMissing { .. }
            | StockdeckError::ConfigInvalid { .. } => 2,
            StockdeckError::Provider { .. } | StockdeckError::RateLimited { .. } => 3,
            StockdeckError::Cache { .. } => 4,
            StockdeckError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
