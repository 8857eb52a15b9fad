//! Domain error types.

/// Top-level error type for chartist.
#[derive(Debug, thiserror::Error)]
pub enum ChartistError {
    #[error("data source error for {symbol} {timeframe}: {reason}")]
    DataSource {
        symbol: String,
        timeframe: String,
        reason: String,
    },

    #[error("no usable data for {symbol} {timeframe}")]
    DataUnavailable { symbol: String, timeframe: String },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ChartistError> for std::process::ExitCode {
    fn from(err: &ChartistError) -> Self {
        let code: u8 = match err {
            ChartistError::Io(_) => 1,
            ChartistError::ConfigParse { .. }
            | ChartistError::ConfigMissing { .. }
            | ChartistError::ConfigInvalid { .. } => 2,
            ChartistError::DataSource { .. } | ChartistError::DataUnavailable { .. } => 3,
            ChartistError::UnknownStrategy { .. } | ChartistError::InvalidParameter { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
