//! Transport-agnostic failures raised by the user directory.
//!
//! An [`Error`] carries one of three [`ErrorCode`] categories: bad client
//! input, a missing user, or an infrastructure fault. The HTTP error boundary
//! is the only place that turns a code into a status.

use std::fmt;

use serde_json::Value;

/// Failure category exposed to clients as a snake case string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Malformed identifier, unparsable body or failed field validation.
    InvalidRequest,
    /// No user exists under the requested identifier.
    NotFound,
    /// The store failed; details are never shown to clients.
    InternalError,
}

impl ErrorCode {
    /// Wire identifier such as `not_found`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::InternalError => "internal_error",
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::NotFound => "Not found",
            Self::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorised failure with an optional JSON payload of details.
///
/// ## Invariants
/// - `message` is never blank.
///
/// # Examples
/// ```
/// use apid::domain::{Error, ErrorCode};
/// use serde_json::json;
///
/// let err = Error::not_found("user not found").with_details(json!({ "userId": "42" }));
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "user not found");
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

impl Error {
    /// Build an error, substituting the code's default message for a blank
    /// one.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            details: None,
        }
    }

    /// Shorthand for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Shorthand for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Shorthand for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Replace the structured details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Whether the failure originated in infrastructure rather than the
    /// request.
    pub fn is_internal(&self) -> bool {
        self.code == ErrorCode::InternalError
    }
}
