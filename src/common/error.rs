use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, CuratorError>;

/// Why a single lookup against the identifier service produced nothing usable.
///
/// Every kind is recovered the same way (move on to the next candidate); the
/// distinction only feeds log lines and metrics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no match")]
    NotFound,
}

impl LookupError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::Transport(_) => "transport",
            LookupError::Timeout => "timeout",
            LookupError::HttpStatus(_) => "http_status",
            LookupError::Malformed(_) => "malformed",
            LookupError::NotFound => "not_found",
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else if err.is_decode() {
            LookupError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            LookupError::HttpStatus(status.as_u16())
        } else {
            LookupError::Transport(err.to_string())
        }
    }
}

/// Cut an error message down for a single log line.
pub fn truncate_detail(detail: &str, max_chars: usize) -> String {
    if detail.chars().count() <= max_chars {
        return detail.to_string();
    }
    let mut out: String = detail.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
