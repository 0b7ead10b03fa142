//! Error type for store collaborator calls.

use thiserror::Error;

/// Result type for store collaborator operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the persistence collaborator.
///
/// The core adds no retry semantics: transient failures propagate to the
/// caller unchanged, and backoff belongs to the adapter's execution
/// strategy.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying store rejected or failed the operation.
    #[error("store error: {0}")]
    Backend(String),

    /// No row matched where one was required.
    #[error("row not found")]
    NotFound,

    /// The operation conflicts with current store state.
    #[error("store conflict: {0}")]
    Conflict(String),

    /// A row could not be serialized or deserialized at the boundary.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
