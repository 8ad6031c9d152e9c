//! Domain error types.

/// Top-level error type for gdaxrates.
#[derive(Debug, thiserror::Error)]
pub enum RatesError {
    #[error("invalid fetch plan: {reason}")]
    Planning { reason: String },

    #[error("remote returned status {status}{}", suffix(.message))]
    Fetch { status: u16, message: Option<String> },

    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("malformed response: {reason}")]
    Malformed { reason: String },

    #[error("{failed_pages} of {total_pages} pages failed to fetch")]
    PartialFetch {
        failed_pages: usize,
        total_pages: usize,
    },

    #[error("rate log header mismatch: expected `{expected}`, found `{found}`")]
    Schema { expected: String, found: String },

    #[error("rate log line {line}: {reason}")]
    Parse { line: u64, reason: String },

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

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl From<&RatesError> for std::process::ExitCode {
    fn from(err: &RatesError) -> Self {
        let code: u8 = match err {
            RatesError::Io(_) => 1,
            RatesError::ConfigParse { .. }
            | RatesError::ConfigMissing { .. }
            | RatesError::ConfigInvalid { .. }
            | RatesError::Planning { .. } => 2,
            RatesError::Fetch { .. }
            | RatesError::Transport { .. }
            | RatesError::Malformed { .. } => 3,
            RatesError::PartialFetch { .. } => 4,
            RatesError::Schema { .. } | RatesError::Parse { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
