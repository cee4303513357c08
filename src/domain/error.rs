//! Domain error types.

/// Top-level error type for etfscan.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
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

    #[error("data source error for {code}: {reason}")]
    DataSource { code: String, reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("insufficient data for {code}: have {bars} bars, need {minimum}")]
    InsufficientData {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("malformed bar series for {code}: {reason}")]
    MalformedBar { code: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalError {
    /// Instrument code the error concerns, if it is a per-series error.
    pub fn code(&self) -> Option<&str> {
        match self {
            SignalError::DataSource { code, .. }
            | SignalError::NoData { code }
            | SignalError::InsufficientData { code, .. }
            | SignalError::MalformedBar { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<&SignalError> for std::process::ExitCode {
    fn from(err: &SignalError) -> Self {
        let code: u8 = match err {
            SignalError::Io(_) => 1,
            SignalError::ConfigParse { .. }
            | SignalError::ConfigMissing { .. }
            | SignalError::ConfigInvalid { .. } => 2,
            SignalError::DataSource { .. } => 3,
            SignalError::NoData { .. }
            | SignalError::InsufficientData { .. }
            | SignalError::MalformedBar { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
