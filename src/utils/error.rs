//! Error types for Vista

use thiserror::Error;

/// Main error type for Vista operations
#[derive(Debug, Error)]
pub enum VistaError {
    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    /// Gallery content errors
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Network-specific errors
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection timed out
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// HTTP error with status code
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// Transport failure reported by the HTTP client
    #[error("transport: {0}")]
    Transport(String),
    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// Response body could not be decoded as an image
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Errors while reading the gallery listing
#[derive(Debug, Error)]
pub enum ContentError {
    /// Listing was not valid JSON or had the wrong shape
    #[error("malformed listing: {0}")]
    Malformed(String),
    /// A media reference could not be turned into a URL
    #[error("unresolvable media for {id}: {reason}")]
    UnresolvableMedia { id: String, reason: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be parsed
    #[error("parse: {0}")]
    Parse(String),
    /// A value is outside its allowed range
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<reqwest::Error> for VistaError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Network(NetworkError::Http(status.as_u16(), err.to_string()));
        }
        Self::Network(NetworkError::Transport(err.to_string()))
    }
}

impl From<url::ParseError> for VistaError {
    fn from(err: url::ParseError) -> Self {
        Self::Network(NetworkError::InvalidUrl(err.to_string()))
    }
}

impl From<serde_json::Error> for VistaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Content(ContentError::Malformed(err.to_string()))
    }
}

/// Convenience Result type for Vista operations
pub type Result<T> = std::result::Result<T, VistaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_error_display() {
        let err: VistaError = NetworkError::Http(404, "not found".into()).into();
        assert_eq!(err.to_string(), "Network error: HTTP 404: not found");
    }

    #[test]
    fn test_json_error_maps_to_content() {
        let err: VistaError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, VistaError::Content(ContentError::Malformed(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            field: "max_concurrent",
            reason: "must be at least 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for `max_concurrent`: must be at least 1"
        );
    }
}
