//! The persistence collaborator contract.
//!
//! An adapter implements [`StoreBackend`] over its engine: translate the
//! tagged query plan, apply tracked row operations in one commit, and
//! execute set-based updates/deletes from property-setter instructions.
//! The core never sees a connection, a transaction, or a SQL string.

use async_trait::async_trait;
use futures::stream::BoxStream;
use keel_query::{Predicate, QueryPlan, StoreResult, Value};

/// One tracked row operation, applied at commit time.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOp<E> {
    Insert(E),
    Update(E),
    Delete(E),
}

/// A property-setter instruction for a set-based write: assign `value`
/// to `field` on every matching row.
#[derive(Debug, Clone, PartialEq)]
pub struct Setter {
    pub field: String,
    pub value: Value,
}

impl Setter {
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// What a bulk operation does to the matching rows.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkKind {
    /// Apply the setters to every matching row.
    Update(Vec<Setter>),
    /// Physically remove every matching row.
    Delete,
}

/// A set-based write against all rows matching `filter`.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOp {
    pub filter: Option<Predicate>,
    pub kind: BulkKind,
}

/// Async persistence session over rows of `E`.
///
/// A session is request-scoped and not safe for concurrent use by multiple
/// in-flight operations; retry/backoff belongs to the adapter's execution
/// strategy, not here.
#[async_trait]
pub trait StoreBackend<E: Send>: Send + Sync {
    /// Fetches rows under `plan`.
    async fn fetch(&self, plan: &QueryPlan) -> StoreResult<Vec<E>>;

    /// Counts rows matching `filter`.
    async fn count(&self, filter: Option<&Predicate>) -> StoreResult<u64>;

    /// Lazily yields rows under `plan` without materializing the full
    /// result set. Dropping the stream cancels the scan.
    fn stream(&self, plan: QueryPlan) -> BoxStream<'_, StoreResult<E>>;

    /// Applies tracked row operations in one commit.
    async fn apply(&self, ops: Vec<RowOp<E>>) -> StoreResult<()>;

    /// Executes a set-based update or delete; returns rows affected.
    async fn execute_bulk(&self, op: BulkOp) -> StoreResult<u64>;
}
