//! The repository facade.
//!
//! One request-scoped object combining reads (single/list/paged/
//! cursor-paged/streamed), tracked writes committed by `save_changes`,
//! set-based bulk writes, and aggregates, composed from the pagination
//! engine, the cursor codec, and the lifecycle processor.

use crate::caps::Entity;
use crate::lifecycle::LifecycleProcessor;
use crate::store::{BulkKind, BulkOp, RowOp, Setter, StoreBackend};
use async_trait::async_trait;
use futures::stream::BoxStream;
use keel_cursor::CursorCodec;
use keel_query::{
    CursorPage, CursorPageRequest, PageLimits, PagedResult, PageRequest, PaginationEngine,
    Predicate, QueryExecutor, QueryPlan, Sort, SortKey, StoreError, StoreResult,
};
use keel_types::{AmbientContext, Error, Outcome};
use std::sync::Arc;
use tracing::debug;

/// Adapts a [`StoreBackend`] to the pagination engine's read contract.
struct BackendExecutor<'a, B>(&'a B);

#[async_trait]
impl<E: Send + Sync, B: StoreBackend<E>> QueryExecutor<E> for BackendExecutor<'_, B> {
    async fn count(&self, filter: Option<&Predicate>) -> StoreResult<u64> {
        self.0.count(filter).await
    }

    async fn fetch(&self, plan: &QueryPlan) -> StoreResult<Vec<E>> {
        self.0.fetch(plan).await
    }
}

/// Request-scoped data-access surface over one entity type.
///
/// Reads go straight to the backend; tracked writes buffer as pending row
/// operations until [`Repository::save_changes`] runs them through the
/// lifecycle processor and commits; bulk writes route through the
/// lifecycle's bulk path before dispatch. Not safe for concurrent use;
/// one repository per in-flight request.
pub struct Repository<E: Entity, B: StoreBackend<E>, C: CursorCodec> {
    backend: B,
    lifecycle: LifecycleProcessor,
    engine: PaginationEngine<C>,
    pending: Vec<RowOp<E>>,
}

impl<E: Entity, B: StoreBackend<E>, C: CursorCodec> Repository<E, B, C> {
    #[must_use]
    pub fn new(backend: B, context: Arc<dyn AmbientContext>, codec: C, limits: PageLimits) -> Self {
        Self {
            backend,
            lifecycle: LifecycleProcessor::new(context),
            engine: PaginationEngine::new(codec, limits),
            pending: Vec::new(),
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    /// First matching row in `sort` order, or `None`. Untracked.
    pub async fn get_first_or_default(
        &self,
        filter: Option<Predicate>,
        sort: Vec<Sort>,
    ) -> Outcome<Option<E>> {
        self.first_under(filter, sort, false).await
    }

    /// Tracked variant of [`Repository::get_first_or_default`]: hints the
    /// adapter to register the row in its identity map.
    pub async fn get_first_or_default_tracked(
        &self,
        filter: Option<Predicate>,
        sort: Vec<Sort>,
    ) -> Outcome<Option<E>> {
        self.first_under(filter, sort, true).await
    }

    async fn first_under(
        &self,
        filter: Option<Predicate>,
        sort: Vec<Sort>,
        tracked: bool,
    ) -> Outcome<Option<E>> {
        let mut plan = QueryPlan::new().take(1);
        plan.filter = filter;
        plan.sort = sort;
        plan.tracked = tracked;
        match self.backend.fetch(&plan).await {
            Ok(rows) => Outcome::success_with(rows.into_iter().next()),
            Err(e) => Outcome::failure(store_failure(e)),
        }
    }

    /// The single matching row, `None` when nothing matches, or a
    /// `Conflict` failure when more than one row matches. Untracked.
    pub async fn get_single_or_default(&self, filter: Option<Predicate>) -> Outcome<Option<E>> {
        self.single_under(filter, false).await
    }

    /// Tracked variant of [`Repository::get_single_or_default`].
    pub async fn get_single_or_default_tracked(
        &self,
        filter: Option<Predicate>,
    ) -> Outcome<Option<E>> {
        self.single_under(filter, true).await
    }

    async fn single_under(&self, filter: Option<Predicate>, tracked: bool) -> Outcome<Option<E>> {
        // Fetch two: one to return, one to detect ambiguity.
        let mut plan = QueryPlan::new().take(2);
        plan.filter = filter;
        plan.tracked = tracked;
        match self.backend.fetch(&plan).await {
            Ok(rows) => {
                if rows.len() > 1 {
                    return Outcome::failure(Error::conflict(
                        "query.multiple_rows",
                        "more than one row matched a single-row query",
                    ));
                }
                Outcome::success_with(rows.into_iter().next())
            }
            Err(e) => Outcome::failure(store_failure(e)),
        }
    }

    /// Row with the given primary key, or `None`.
    pub async fn get_by_id(&self, key: E::Key) -> Outcome<Option<E>> {
        self.get_first_or_default(Some(Predicate::eq(E::KEY_FIELD, key)), Vec::new())
            .await
    }

    /// All rows under `plan`.
    pub async fn get_list(&self, plan: QueryPlan) -> Outcome<Vec<E>> {
        match self.backend.fetch(&plan).await {
            Ok(rows) => Outcome::success_with(rows),
            Err(e) => Outcome::failure(store_failure(e)),
        }
    }

    /// Read-only query transform: fetch under `plan`, map each row.
    pub async fn project<R>(&self, plan: QueryPlan, map: impl Fn(E) -> R + Send) -> Outcome<Vec<R>> {
        self.get_list(plan).await.map(|rows| rows.into_iter().map(map).collect())
    }

    /// Lazy, cancellable scan. Rows arrive as the store yields them;
    /// dropping the stream stops the scan.
    pub fn stream(&self, plan: QueryPlan) -> BoxStream<'_, StoreResult<E>> {
        self.backend.stream(plan)
    }

    /// Offset pagination with a total count.
    pub async fn get_paged(
        &self,
        filter: Option<Predicate>,
        sort: Vec<Sort>,
        request: PageRequest,
    ) -> Outcome<PagedResult<E>> {
        self.engine
            .offset_page(&BackendExecutor(&self.backend), filter, sort, request)
            .await
    }

    /// Cursor pagination over `sort_key`.
    pub async fn get_cursor_paged(
        &self,
        filter: Option<Predicate>,
        sort_key: &SortKey<E>,
        request: CursorPageRequest,
    ) -> Outcome<CursorPage<E>> {
        self.engine
            .cursor_page(&BackendExecutor(&self.backend), filter, sort_key, request)
            .await
    }

    // ── Aggregates ───────────────────────────────────────────────

    /// Whether any row matches.
    pub async fn any(&self, filter: Option<Predicate>) -> Outcome<bool> {
        self.count(filter).await.map(|n| n > 0)
    }

    /// Number of matching rows.
    pub async fn count(&self, filter: Option<Predicate>) -> Outcome<u64> {
        match self.backend.count(filter.as_ref()).await {
            Ok(n) => Outcome::success_with(n),
            Err(e) => Outcome::failure(store_failure(e)),
        }
    }

    // ── Tracked writes ───────────────────────────────────────────

    /// Buffers an insert for the next [`Repository::save_changes`].
    pub fn add(&mut self, entity: E) {
        self.pending.push(RowOp::Insert(entity));
    }

    /// Buffers a batch of inserts.
    pub fn add_range(&mut self, entities: impl IntoIterator<Item = E>) {
        self.pending.extend(entities.into_iter().map(RowOp::Insert));
    }

    /// Buffers an update.
    pub fn update(&mut self, entity: E) {
        self.pending.push(RowOp::Update(entity));
    }

    /// Buffers a batch of updates.
    pub fn update_range(&mut self, entities: impl IntoIterator<Item = E>) {
        self.pending.extend(entities.into_iter().map(RowOp::Update));
    }

    /// Buffers a delete. Soft-deletable types are converted to a flag
    /// update at commit time.
    pub fn delete(&mut self, entity: E) {
        self.pending.push(RowOp::Delete(entity));
    }

    /// Buffers a batch of deletes.
    pub fn delete_range(&mut self, entities: impl IntoIterator<Item = E>) {
        self.pending.extend(entities.into_iter().map(RowOp::Delete));
    }

    /// Number of buffered row operations.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Runs the lifecycle tracked path over the buffered operations and
    /// commits them. The buffer is drained even on failure; a failed
    /// commit is not retried with stale stamps.
    pub async fn save_changes(&mut self) -> Outcome<()> {
        if self.pending.is_empty() {
            return Outcome::success();
        }
        let ops = self.lifecycle.process_tracked(std::mem::take(&mut self.pending));
        debug!(ops = ops.len(), "committing tracked row operations");
        match self.backend.apply(ops).await {
            Ok(()) => Outcome::success(),
            Err(e) => Outcome::failure(store_failure(e)),
        }
    }

    // ── Bulk writes ──────────────────────────────────────────────

    /// Set-based update of all matching rows. Audit setters are appended
    /// for auditable types; returns rows affected.
    pub async fn execute_bulk_update(
        &self,
        filter: Option<Predicate>,
        mut setters: Vec<Setter>,
    ) -> Outcome<u64> {
        self.lifecycle.append_bulk_update_setters::<E>(&mut setters);
        self.dispatch_bulk(BulkOp {
            filter,
            kind: BulkKind::Update(setters),
        })
        .await
    }

    /// Set-based delete of all matching rows. Soft-deletable types are
    /// re-issued as a bulk flag update; returns rows affected.
    pub async fn execute_bulk_delete(&self, filter: Option<Predicate>) -> Outcome<u64> {
        let op = self.lifecycle.plan_bulk_delete::<E>(filter, false);
        self.dispatch_bulk(op).await
    }

    /// Set-based physical delete, bypassing the soft-delete conversion.
    pub async fn execute_bulk_delete_physical(&self, filter: Option<Predicate>) -> Outcome<u64> {
        let op = self.lifecycle.plan_bulk_delete::<E>(filter, true);
        self.dispatch_bulk(op).await
    }

    async fn dispatch_bulk(&self, op: BulkOp) -> Outcome<u64> {
        match self.backend.execute_bulk(op).await {
            Ok(affected) => Outcome::success_with(affected),
            Err(e) => Outcome::failure(store_failure(e)),
        }
    }
}

fn store_failure(e: StoreError) -> Error {
    match e {
        StoreError::NotFound => Error::not_found("store.not_found", e.to_string()),
        StoreError::Conflict(_) => Error::conflict("store.conflict", e.to_string()),
        _ => Error::failure("store.execute", e.to_string()),
    }
}
