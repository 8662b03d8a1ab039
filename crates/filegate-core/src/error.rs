//! Unified application error types for FileGate.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested metadata record or stored object was not found.
    NotFound,
    /// A backend rejected an operation (auth, quota, validation). The
    /// backend's HTTP status code is carried on the error itself.
    BackendRejected,
    /// A chunk write failed after earlier chunks had already succeeded.
    /// The remote object is in an inconsistent state and must be treated
    /// as unusable by the caller.
    PartialWrite,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A storage I/O error occurred.
    Storage,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An uncategorized failure. Catch-all used when no more specific
    /// classification applies.
    Exception,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::BackendRejected => write!(f, "BACKEND_REJECTED"),
            Self::PartialWrite => write!(f, "PARTIAL_WRITE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Exception => write!(f, "EXCEPTION"),
        }
    }
}

/// The unified application error used throughout FileGate.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code reported by a remote backend, when one exists.
    pub status_code: Option<u16>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a backend-rejected error carrying the backend's status code.
    pub fn backend_rejected(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::BackendRejected,
            message: message.into(),
            status_code: Some(status_code),
            source: None,
        }
    }

    /// Create a partial-write error, preserving the status code of the
    /// chunk failure that caused it.
    pub fn partial_write(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            kind: ErrorKind::PartialWrite,
            message: message.into(),
            status_code,
            source: None,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create an uncategorized error.
    pub fn exception(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Exception, message)
    }

    /// Whether this error is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            status_code: self.status_code,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_rejected_carries_status_code() {
        let err = AppError::backend_rejected(403, "quota exceeded");
        assert_eq!(err.kind, ErrorKind::BackendRejected);
        assert_eq!(err.status_code, Some(403));
        assert_eq!(err.to_string(), "BACKEND_REJECTED: quota exceeded");
    }

    #[test]
    fn clone_drops_source_but_keeps_status() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let mut err = AppError::with_source(ErrorKind::Storage, "write failed", io);
        err.status_code = Some(500);
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.status_code, Some(500));
    }
}
