//! Error types for Contact Scout
//!
//! The extraction engine itself never fails: malformed candidates are dropped
//! and missing input degrades to an empty report. Errors only surface at the
//! edges (configuration, page fetching, protocol parsing, export), and this
//! module gives them a `thiserror` hierarchy.

use thiserror::Error;

/// The main error type for Contact Scout operations
#[derive(Error, Debug)]
pub enum Error {
    /// Content extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Page protocol errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Page fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Content extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Invalid selector
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Page protocol errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Request line could not be decoded
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The channel to the page closed before a response was produced
    #[error("Page channel closed")]
    ChannelClosed,
}

/// Page fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Page load timeout
    #[error("Page load timed out after {0}s")]
    Timeout(u64),

    /// HTTP error
    #[error("HTTP error {status}: {url}")]
    HttpError {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {message}")]
    Unreadable {
        /// Path that was read
        path: String,
        /// Underlying failure
        message: String,
    },

    /// A value is out of its accepted range
    #[error("Invalid config value for {field}: {message}")]
    InvalidValue {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        message: String,
    },
}

/// Result type alias for Contact Scout operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Error::Fetch(FetchError::NetworkError(format!("timeout: {}", err)));
        }
        match err.status() {
            Some(status) => Error::Fetch(FetchError::HttpError {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }),
            None => Error::Fetch(FetchError::NetworkError(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error() {
        let err = Error::Extraction(ExtractionError::InvalidSelector("..".to_string()));
        assert!(err.to_string().contains("Invalid selector"));
    }

    #[test]
    fn test_fetch_error() {
        let err = FetchError::HttpError {
            status: 404,
            url: "https://example.com/missing".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("example.com/missing"));
    }

    #[test]
    fn test_config_error() {
        let err = ConfigError::InvalidValue {
            field: "max_depth",
            message: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid config value for max_depth: must be at least 1"
        );
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
