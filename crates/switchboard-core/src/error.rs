use core::result::Result as CoreResult;
use std::io::Error as IoError;

use reqwest::Error as ReqwestError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur at the adapter boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// An HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An attempt exceeded its timeout bound.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// A provider backend reported a failure.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A provider rejected the call due to rate limiting.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// A provider rejected the call's credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A provider returned a response the adapter could not parse.
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

/// Classification of attempt failures recorded on a job's audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The attempt exceeded its timeout bound.
    Timeout,
    /// The provider backend failed or returned garbage.
    Provider,
    /// The provider rate-limited the call.
    RateLimited,
    /// The provider rejected the call's credentials.
    Auth,
}

impl Error {
    /// Classifies this error for a job's attempt record.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::RateLimited(_) => FailureKind::RateLimited,
            Self::Auth(_) => FailureKind::Auth,
            _ => FailureKind::Provider,
        }
    }

    /// Determines whether this error may succeed if retried elsewhere.
    ///
    /// Auth failures are sticky to the credential, not the moment, but a
    /// different provider with different credentials may still serve the job.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Json(_) | Self::Toml(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let error1 = Error::Provider("backend exploded".to_owned());
        assert_eq!(error1.to_string(), "Provider error: backend exploded");

        let error2 = Error::Timeout(5000);
        assert_eq!(error2.to_string(), "Timeout after 5000ms");

        let error3 = Error::RateLimited("slow down".to_owned());
        assert_eq!(error3.to_string(), "Rate limited: slow down");
    }

    #[test]
    fn test_failure_kind_classification() {
        assert_eq!(Error::Timeout(100).kind(), FailureKind::Timeout);
        assert_eq!(
            Error::RateLimited("429".to_owned()).kind(),
            FailureKind::RateLimited
        );
        assert_eq!(Error::Auth("401".to_owned()).kind(), FailureKind::Auth);
        assert_eq!(
            Error::Provider("500".to_owned()).kind(),
            FailureKind::Provider
        );
        assert_eq!(
            Error::InvalidResponse("not json".to_owned()).kind(),
            FailureKind::Provider
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "gone");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(Error::Timeout(100).is_retryable());
        assert!(Error::Provider("flaky".to_owned()).is_retryable());
        assert!(!Error::Config("bad config".to_owned()).is_retryable());
    }
}
