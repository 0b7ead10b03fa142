//! Query expression model and pagination engine for Keel.
//!
//! Queries cross the store boundary as small tagged expressions
//! ([`Predicate`], [`Sort`], [`QueryPlan`]) that the adapter translates into
//! its own dialect; this crate never generates SQL. On top of that model sit
//! the two pagination strategies:
//!
//! - **Offset**: skip/take plus a total count, for bounded, numbered pages.
//! - **Cursor**: keyset traversal with opaque tokens, for large tables
//!   where a deep offset scan or a count query would defeat the purpose.
//!
//! The cursor strategy's single correctness-critical idiom is *fetch
//! `page_size + 1`, trim, infer more*: the engine never issues a count
//! query for cursor pages.

mod engine;
mod error;
mod expr;
pub mod keyset;
mod page;

pub use engine::{PaginationEngine, QueryExecutor};
pub use error::{StoreError, StoreResult};
pub use expr::{Compare, Condition, Predicate, QueryPlan, Sort, SortKey, Value};
pub use keyset::Traversal;
pub use page::{CursorPage, CursorPageRequest, PageLimits, PageRequest, PagedResult};
