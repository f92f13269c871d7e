//! Error types for s3c-core
//!
//! Only construction, configuration and local file-store code returns these.
//! Remote operations never fail with an `Error`; they return an
//! [`Envelope`](crate::Envelope) instead.

use thiserror::Error;

/// Result type alias for s3c-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for s3c-core operations
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid client configuration (API key, base URL, timeout)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local path rejected by the file store
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Local file not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Shorthand for building a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::config("API key is required");
        assert_eq!(err.to_string(), "Configuration error: API key is required");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
