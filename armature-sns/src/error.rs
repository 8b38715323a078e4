//! SNS push error types.

use std::fmt;

use thiserror::Error;

/// Result type for SNS push operations.
pub type Result<T> = std::result::Result<T, SnsError>;

/// Category of an [`SnsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint or application does not exist.
    NotFound,
    /// Duplicate registration or ambiguous description.
    Conflict,
    /// Missing or malformed argument.
    InvalidArgument,
    /// The relay call itself failed.
    RemoteFailure,
}

impl ErrorKind {
    /// Get kind name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::RemoteFailure => "remote failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SNS push error, tagged with the operation that raised it.
#[derive(Debug, Clone, Error)]
#[error("{operation}: {kind}: {message}")]
pub struct SnsError {
    operation: &'static str,
    kind: ErrorKind,
    message: String,
}

impl SnsError {
    /// Create a new error.
    pub fn new(operation: &'static str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::Conflict, message)
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::InvalidArgument, message)
    }

    /// Create a remote failure error.
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::RemoteFailure, message)
    }

    /// Re-tag this error with an enclosing operation.
    ///
    /// The kind is kept and the inner operation becomes part of the message,
    /// so `CreateEndpoint` wrapping a `GetApplication` failure reads
    /// `CreateEndpoint: not found: GetApplication: not found: ...`.
    pub fn within(self, operation: &'static str) -> Self {
        if self.operation == operation {
            return self;
        }
        let message = self.to_string();
        Self {
            operation,
            kind: self.kind,
            message,
        }
    }

    /// Operation that raised the error.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Error category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message without the operation/kind prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::Conflict
    }
}

impl From<serde_json::Error> for SnsError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_argument("Serialize", err.to_string())
    }
}
