//! The domain error value carried by [`Outcome`](crate::Outcome).
//!
//! `Error` is a plain value, not a `std::error::Error` implementor: it is the
//! wire-visible shape callers branch on (`kind` + stable `code`), not an
//! exception. Internal infrastructure failures use `thiserror` enums in the
//! crates that own them and are mapped into `Error` at the facade boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad classification of a domain error, mirroring the HTTP-adjacent
/// categories callers typically translate these into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Generic failure (store errors, unexpected conditions).
    Failure,
    /// Caller-supplied input was invalid.
    Validation,
    /// The requested row or resource does not exist.
    NotFound,
    /// The operation conflicts with current state.
    Conflict,
    /// The caller is not authenticated.
    Unauthorized,
    /// The caller is authenticated but not allowed.
    Forbidden,
}

/// An immutable domain error: a stable code, a human-readable description,
/// and a [`ErrorKind`] classification.
///
/// Two errors are equal iff all three fields match. The sentinel
/// [`Error::NONE`] represents "no error" and is only ever observed through
/// a successful [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Error {
    code: String,
    description: String,
    kind: ErrorKind,
}

impl Error {
    /// The "no error" sentinel. Constructing a failed outcome from it is a
    /// programmer error.
    pub const NONE: Self = Self {
        code: String::new(),
        description: String::new(),
        kind: ErrorKind::Failure,
    };

    /// Creates an error with an explicit kind.
    #[must_use]
    pub fn new(kind: ErrorKind, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            kind,
        }
    }

    /// Creates a generic failure error.
    #[must_use]
    pub fn failure(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Failure, code, description)
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, code, description)
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, code, description)
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, code, description)
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, code, description)
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, code, description)
    }

    /// The error returned by [`Outcome::create`](crate::Outcome::create)
    /// when handed an absent value.
    #[must_use]
    pub fn null_value() -> Self {
        Self::failure("error.null_value", "a required value was absent")
    }

    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this is the "no error" sentinel.
    #[must_use]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "(no error)")
        } else {
            write!(f, "[{:?}] {}: {}", self.kind, self.code, self.description)
        }
    }
}
