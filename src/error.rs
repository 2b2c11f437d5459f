use thiserror::Error;

/// Main error type for the acquisition engine
#[derive(Error, Debug)]
pub enum DeskError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    Status { status: u16, url: String },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    // Caller precondition violations
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// True for the failure kinds a fetch loop absorbs locally: transport
    /// failures (timeout, connect, non-2xx) and payload parse failures.
    /// Anything else is a bug or a caller error and must propagate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DeskError::Http(_) | DeskError::Status { .. } | DeskError::Json(_) | DeskError::Parse(_)
        )
    }

    /// Short label used in logs and attempt reports.
    pub fn kind(&self) -> &'static str {
        match self {
            DeskError::Http(e) if e.is_timeout() => "timeout",
            DeskError::Http(_) | DeskError::Status { .. } => "transport",
            DeskError::Json(_) | DeskError::Parse(_) => "parse",
            DeskError::InvalidArgument(_) => "invalid_argument",
            DeskError::Config(_) | DeskError::InvalidConfig(_) => "config",
            DeskError::Io(_) => "io",
            DeskError::Internal(_) => "internal",
        }
    }
}

/// Result type alias for DeskError
pub type Result<T> = std::result::Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_parse_are_recoverable() {
        let status = DeskError::Status {
            status: 503,
            url: "https://example.com".into(),
        };
        assert!(status.is_recoverable());
        assert_eq!(status.kind(), "transport");

        let parse = DeskError::Parse("missing drwtNo3".into());
        assert!(parse.is_recoverable());

        let json = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert!(DeskError::from(json).is_recoverable());
    }

    #[test]
    fn test_caller_and_internal_errors_propagate() {
        assert!(!DeskError::InvalidArgument("low > high".into()).is_recoverable());
        assert!(!DeskError::Internal("bad state".into()).is_recoverable());
        assert!(!DeskError::InvalidConfig("ttl".into()).is_recoverable());
    }

    #[test]
    fn test_status_display_includes_url() {
        let err = DeskError::Status {
            status: 404,
            url: "https://example.com/x".into(),
        };
        assert_eq!(err.to_string(), "Upstream returned 404 for https://example.com/x");
    }
}
