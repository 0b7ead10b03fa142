//! Railway-oriented result type for the data-access surface.
//!
//! Every fallible repository operation returns an [`Outcome`] rather than a
//! `std::result::Result`, so callers can branch on typed domain errors and
//! chain steps without exception-style control flow. The invariant is strict:
//! a successful outcome carries no real error, a failed one carries at least
//! one. Constructing a value that violates the invariant is a bug in the
//! caller and panics immediately rather than being silently corrected.

use crate::{Error, ErrorKind};

/// A success-or-failure value carrying either a payload or an ordered list
/// of domain [`Error`]s.
///
/// Use `Outcome<()>` for operations with no payload.
///
/// # Panics
///
/// Constructors panic when the invariant would be violated (a failure built
/// from the sentinel, or from no errors at all), and [`Outcome::value`] /
/// [`Outcome::into_value`] panic on a failed outcome. Both are programmer
/// errors, never runtime conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    value: Option<T>,
    errors: Vec<Error>,
}

impl Outcome<()> {
    /// Creates a successful outcome with no payload.
    #[must_use]
    pub fn success() -> Self {
        Self {
            value: Some(()),
            errors: Vec::new(),
        }
    }
}

impl<T> Outcome<T> {
    /// Creates a successful outcome carrying `value`.
    #[must_use]
    pub fn success_with(value: T) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    /// Creates a failed outcome from a single error.
    ///
    /// # Panics
    ///
    /// Panics if `error` is the [`Error::NONE`] sentinel.
    #[must_use]
    pub fn failure(error: Error) -> Self {
        assert!(
            !error.is_none(),
            "Outcome::failure called with the no-error sentinel"
        );
        Self {
            value: None,
            errors: vec![error],
        }
    }

    /// Creates a failed outcome from an ordered list of errors.
    ///
    /// # Panics
    ///
    /// Panics if the list is empty or contains the sentinel.
    #[must_use]
    pub fn failure_all(errors: Vec<Error>) -> Self {
        assert!(
            !errors.is_empty(),
            "Outcome::failure_all called with no errors"
        );
        assert!(
            errors.iter().all(|e| !e.is_none()),
            "Outcome::failure_all called with the no-error sentinel"
        );
        Self {
            value: None,
            errors,
        }
    }

    /// Success iff `value` is present, otherwise a failure carrying
    /// [`Error::null_value`].
    #[must_use]
    pub fn create(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::success_with(v),
            None => Self::failure(Error::null_value()),
        }
    }

    /// Returns true if the outcome is successful.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if the outcome failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the errors of a failed outcome; empty for a success.
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Returns the first error, or the sentinel for a success.
    #[must_use]
    pub fn first_error(&self) -> Error {
        self.errors.first().cloned().unwrap_or(Error::NONE)
    }

    /// Borrows the payload of a successful outcome.
    ///
    /// # Panics
    ///
    /// Panics if the outcome failed.
    #[must_use]
    pub fn value(&self) -> &T {
        self.value
            .as_ref()
            .expect("Outcome::value read on a failed outcome")
    }

    /// Consumes the outcome and returns its payload.
    ///
    /// # Panics
    ///
    /// Panics if the outcome failed.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
            .expect("Outcome::into_value on a failed outcome")
    }

    /// Re-types a failed outcome without touching its errors.
    ///
    /// # Panics
    ///
    /// Panics on a successful outcome; use [`Outcome::map`] to carry a
    /// payload across types.
    #[must_use]
    pub fn cast<U>(self) -> Outcome<U> {
        assert!(
            self.is_failure(),
            "Outcome::cast on a successful outcome; use map instead"
        );
        Outcome {
            value: None,
            errors: self.errors,
        }
    }

    /// Chains a fallible step. Skipped entirely on failure; the original
    /// error list propagates unchanged.
    #[must_use]
    pub fn bind<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self.value {
            Some(v) if self.errors.is_empty() => f(v),
            _ => Outcome {
                value: None,
                errors: self.errors,
            },
        }
    }

    /// Transforms the payload. Skipped on failure.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self.value {
            Some(v) if self.errors.is_empty() => Outcome::success_with(f(v)),
            _ => Outcome {
                value: None,
                errors: self.errors,
            },
        }
    }

    /// Runs a side effect against the payload, passing the outcome through.
    /// Skipped on failure.
    #[must_use]
    pub fn tap(self, f: impl FnOnce(&T)) -> Self {
        if let Some(v) = self.value.as_ref() {
            if self.errors.is_empty() {
                f(v);
            }
        }
        self
    }

    /// Fails with `error` when `predicate` rejects the payload. An
    /// already-failed outcome is returned unchanged and the predicate is
    /// never invoked.
    #[must_use]
    pub fn ensure(self, predicate: impl FnOnce(&T) -> bool, error: Error) -> Self {
        match self.value {
            Some(ref v) if self.errors.is_empty() => {
                if predicate(v) {
                    self
                } else {
                    Self::failure(error)
                }
            }
            _ => self,
        }
    }

    /// Collapses the outcome into a single value.
    #[must_use]
    pub fn match_with<U>(
        self,
        on_success: impl FnOnce(T) -> U,
        on_failure: impl FnOnce(Vec<Error>) -> U,
    ) -> U {
        match self.value {
            Some(v) if self.errors.is_empty() => on_success(v),
            _ => on_failure(self.errors),
        }
    }

    /// Shorthand for a single-error failure of a given kind.
    #[must_use]
    pub fn fail(kind: ErrorKind, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::failure(Error::new(kind, code, description))
    }
}

impl<T> From<Error> for Outcome<T> {
    fn from(error: Error) -> Self {
        Self::failure(error)
    }
}
