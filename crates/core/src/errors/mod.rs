//! Error types and Result alias for the NumberPlay client

use thiserror::Error;

/// Main error type for the NumberPlay client
#[derive(Error, Debug)]
pub enum Error {
    #[error("No authentication token found")]
    AuthenticationMissing,

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Session token expired")]
    TokenExpired,

    #[error("{0}")]
    ValidationError(String),

    #[error("Too many requests, please slow down")]
    RateLimited,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Whether the user has to log in (again) to recover from this error
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationMissing | Error::AuthenticationError(_) | Error::TokenExpired
        )
    }
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_login() {
        assert!(Error::AuthenticationMissing.requires_login());
        assert!(Error::TokenExpired.requires_login());
        assert!(Error::AuthenticationError("forbidden".into()).requires_login());
        assert!(!Error::RateLimited.requires_login());
        assert!(!Error::NetworkError("refused".into()).requires_login());
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = Error::ValidationError("Number cannot exceed 9999.".into());
        assert_eq!(err.to_string(), "Number cannot exceed 9999.");
    }
}
