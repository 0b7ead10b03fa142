//! The pagination engine.
//!
//! Orchestrates offset and cursor pagination over a composable query
//! issued through the [`QueryExecutor`] collaborator. The engine owns the
//! parameter guard rails and the cursor bookkeeping; the executor owns the
//! dialect.

use crate::error::StoreResult;
use crate::expr::{Predicate, QueryPlan, Sort, SortKey, Value};
use crate::keyset::{self, Traversal};
use crate::page::{CursorPage, CursorPageRequest, PageLimits, PageRequest, PagedResult};
use async_trait::async_trait;
use keel_cursor::CursorCodec;
use keel_types::{Error, Outcome};
use tracing::debug;

/// Read-side collaborator: issues composable queries over rows of `T`.
#[async_trait]
pub trait QueryExecutor<T: Send>: Send + Sync {
    /// Counts rows matching `filter`.
    async fn count(&self, filter: Option<&Predicate>) -> StoreResult<u64>;

    /// Fetches rows under `plan`.
    async fn fetch(&self, plan: &QueryPlan) -> StoreResult<Vec<T>>;
}

/// Offset and cursor pagination over a [`QueryExecutor`].
///
/// Stateless apart from its codec and limits; safe to share across
/// requests.
pub struct PaginationEngine<C> {
    codec: C,
    limits: PageLimits,
}

impl<C: CursorCodec> PaginationEngine<C> {
    #[must_use]
    pub fn new(codec: C, limits: PageLimits) -> Self {
        Self { codec, limits }
    }

    #[must_use]
    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Offset pagination: validate, count once, then skip/take.
    ///
    /// A zero total short-circuits to an empty page without a second
    /// round-trip.
    pub async fn offset_page<T: Send, X: QueryExecutor<T>>(
        &self,
        executor: &X,
        filter: Option<Predicate>,
        sort: Vec<Sort>,
        request: PageRequest,
    ) -> Outcome<PagedResult<T>> {
        if request.page_number < 1 {
            return Outcome::failure(Error::validation(
                "page.number.invalid",
                "page number must be at least 1",
            ));
        }
        if request.page_size < 1 {
            return Outcome::failure(Error::validation(
                "page.size.invalid",
                "page size must be at least 1",
            ));
        }
        if request.page_size > self.limits.max_page_size {
            return Outcome::failure(Error::validation(
                "page.size.exceeded",
                format!(
                    "page size {} exceeds the maximum of {}",
                    request.page_size, self.limits.max_page_size
                ),
            ));
        }
        let offset = u64::from(request.page_number - 1) * u64::from(request.page_size);
        if offset > self.limits.max_offset {
            return Outcome::failure(Error::validation(
                "page.offset.exceeded",
                format!(
                    "offset {} exceeds the maximum of {}",
                    offset, self.limits.max_offset
                ),
            ));
        }

        let total = match executor.count(filter.as_ref()).await {
            Ok(n) => n,
            Err(e) => return Outcome::failure(store_failure(e)),
        };
        if total == 0 {
            debug!("offset page short-circuit: zero matching rows");
            return Outcome::success_with(PagedResult::new(
                Vec::new(),
                request.page_number,
                request.page_size,
                0,
            ));
        }

        let plan = QueryPlan {
            filter,
            sort,
            offset: Some(offset),
            limit: Some(u64::from(request.page_size)),
            tracked: false,
        };
        match executor.fetch(&plan).await {
            Ok(items) => Outcome::success_with(PagedResult::new(
                items,
                request.page_number,
                request.page_size,
                total,
            )),
            Err(e) => Outcome::failure(store_failure(e)),
        }
    }

    /// Cursor pagination: fetch `page_size + 1` past the decoded boundary,
    /// trim the probe row, and derive the outgoing cursors.
    ///
    /// An absent, malformed, or expired cursor token decodes to "no
    /// boundary", the first page in the traversal direction. Never issues
    /// a count query.
    pub async fn cursor_page<T: Send, X: QueryExecutor<T>>(
        &self,
        executor: &X,
        filter: Option<Predicate>,
        sort_key: &SortKey<T>,
        request: CursorPageRequest,
    ) -> Outcome<CursorPage<T>> {
        if request.page_size < 1 {
            return Outcome::failure(Error::validation(
                "page.size.invalid",
                "page size must be at least 1",
            ));
        }
        if request.page_size > self.limits.max_page_size {
            return Outcome::failure(Error::validation(
                "page.size.exceeded",
                format!(
                    "page size {} exceeds the maximum of {}",
                    request.page_size, self.limits.max_page_size
                ),
            ));
        }

        let traversal = request.traversal;
        // A token that fails to decode degrades to "no cursor" so that a
        // forged token is indistinguishable from an absent one.
        let boundary_key: Option<Value> = request
            .cursor
            .as_deref()
            .and_then(|token| self.codec.decode(token));
        let at_boundary = boundary_key.is_some();

        let mut plan_filter = filter;
        if let Some(key) = boundary_key {
            let bound = Predicate::Cmp(keyset::boundary(sort_key.sort(), traversal, &key));
            plan_filter = Some(match plan_filter.take() {
                Some(existing) => existing.and(bound),
                None => bound,
            });
        }

        let page_size = usize::try_from(request.page_size).unwrap_or(usize::MAX);
        let plan = QueryPlan {
            filter: plan_filter,
            sort: vec![keyset::effective_sort(sort_key.sort(), traversal)],
            offset: None,
            limit: Some(u64::from(request.page_size) + 1),
            tracked: false,
        };

        let mut items = match executor.fetch(&plan).await {
            Ok(items) => items,
            Err(e) => return Outcome::failure(store_failure(e)),
        };

        let has_more = items.len() > page_size;
        items.truncate(page_size);
        if traversal == Traversal::Backward {
            // Rows were walked boundary-first; restore the caller's order.
            items.reverse();
        }
        debug!(
            rows = items.len(),
            has_more,
            backward = traversal == Traversal::Backward,
            "cursor page fetched"
        );

        let next_cursor = match traversal {
            Traversal::Forward if has_more => items
                .last()
                .and_then(|row| self.codec.encode(&sort_key.key_of(row))),
            _ => None,
        };
        let previous_cursor = match traversal {
            Traversal::Backward if has_more => items
                .first()
                .and_then(|row| self.codec.encode(&sort_key.key_of(row))),
            _ => None,
        };
        let (has_next_page, has_previous_page) = match traversal {
            Traversal::Forward => (has_more, at_boundary),
            Traversal::Backward => (at_boundary, has_more),
        };

        Outcome::success_with(CursorPage {
            items,
            next_cursor,
            previous_cursor,
            has_next_page,
            has_previous_page,
            page_size: request.page_size,
        })
    }
}

fn store_failure(e: crate::error::StoreError) -> Error {
    Error::failure("store.query", e.to_string())
}
