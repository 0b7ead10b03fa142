//! Keyset comparator construction.
//!
//! Given a sort direction and a traversal direction, one page is bounded by
//! a single comparison against the cursor key:
//!
//! | sort       | traversal | boundary        |
//! |------------|-----------|-----------------|
//! | ascending  | forward   | `key > cursor`  |
//! | ascending  | backward  | `key < cursor`  |
//! | descending | forward   | `key < cursor`  |
//! | descending | backward  | `key > cursor`  |
//!
//! Walking backward also inverts the fetch order; the engine restores the
//! caller's order by reversing the retained rows afterwards.

use crate::expr::{Compare, Condition, Sort, Value};
use serde::{Deserialize, Serialize};

/// Which way a cursor page walks from its boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    /// Toward later rows in the requested order.
    #[default]
    Forward,
    /// Toward earlier rows in the requested order.
    Backward,
}

/// Builds the boundary comparison for one page fetch.
///
/// On the first page there is no cursor and no boundary; callers only
/// invoke this with a decoded cursor key in hand. A null key has no
/// defined position in the order.
#[must_use]
pub fn boundary(sort: &Sort, traversal: Traversal, cursor: &Value) -> Condition {
    debug_assert!(!cursor.is_null(), "keyset boundary built from a null key");
    let walks_up = sort.ascending == (traversal == Traversal::Forward);
    let op = if walks_up { Compare::Gt } else { Compare::Lt };
    Condition::new(sort.field.clone(), op, cursor.clone())
}

/// The sort order actually sent to the store for one page fetch: the
/// requested order when moving forward, inverted when moving backward.
#[must_use]
pub fn effective_sort(sort: &Sort, traversal: Traversal) -> Sort {
    match traversal {
        Traversal::Forward => sort.clone(),
        Traversal::Backward => sort.reversed(),
    }
}
