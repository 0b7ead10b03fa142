//! Tagged query expressions.
//!
//! A [`Predicate`] is a store-agnostic filter tree over typed [`Value`]s;
//! the adapter behind the store boundary walks it and emits whatever its
//! engine understands. Sort-key access for cursor pagination is a
//! monomorphized closure ([`SortKey`]), resolved at compile time, so no
//! per-call reflection or process-wide accessor cache exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A typed scalar crossing the store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compare {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A single field comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub op: Compare,
    pub value: Value,
}

impl Condition {
    #[must_use]
    pub fn new(field: impl Into<String>, op: Compare, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// A store-agnostic filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Predicate {
    /// A single comparison.
    Cmp(Condition),
    /// All branches must hold.
    All(Vec<Predicate>),
    /// At least one branch must hold.
    Any(Vec<Predicate>),
    /// Negation.
    Not(Box<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn cmp(field: impl Into<String>, op: Compare, value: impl Into<Value>) -> Self {
        Self::Cmp(Condition::new(field, op, value))
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, Compare::Eq, value)
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, Compare::Ne, value)
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, Compare::Lt, value)
    }

    #[must_use]
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, Compare::Le, value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, Compare::Gt, value)
    }

    #[must_use]
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, Compare::Ge, value)
    }

    /// Conjunction, flattening nested `All` nodes.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::All(mut a), Self::All(b)) => {
                a.extend(b);
                Self::All(a)
            }
            (Self::All(mut a), b) => {
                a.push(b);
                Self::All(a)
            }
            (a, Self::All(mut b)) => {
                b.insert(0, a);
                Self::All(b)
            }
            (a, b) => Self::All(vec![a, b]),
        }
    }

    /// Disjunction.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Any(mut a), Self::Any(b)) => {
                a.extend(b);
                Self::Any(a)
            }
            (a, b) => Self::Any(vec![a, b]),
        }
    }

    /// Negation.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// A sort directive over one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub ascending: bool,
}

impl Sort {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }

    /// The same field, opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            ascending: !self.ascending,
        }
    }
}

/// A [`Sort`] paired with an accessor extracting the key from a row, used
/// by cursor pagination to turn boundary rows into cursor values.
#[derive(Clone)]
pub struct SortKey<T> {
    sort: Sort,
    key: Arc<dyn Fn(&T) -> Value + Send + Sync>,
}

impl<T> SortKey<T> {
    #[must_use]
    pub fn new(sort: Sort, key: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self {
            sort,
            key: Arc::new(key),
        }
    }

    #[must_use]
    pub fn asc(
        field: impl Into<String>,
        key: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::new(Sort::asc(field), key)
    }

    #[must_use]
    pub fn desc(
        field: impl Into<String>,
        key: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::new(Sort::desc(field), key)
    }

    #[must_use]
    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Extracts the cursor key from a row.
    #[must_use]
    pub fn key_of(&self, row: &T) -> Value {
        (self.key)(row)
    }
}

impl<T> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey").field("sort", &self.sort).finish()
    }
}

/// A composed read: filter, sort order, and window.
///
/// `offset`/`limit` are row counts after filtering; `None` means
/// unbounded. Adapters apply the parts in that order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryPlan {
    pub filter: Option<Predicate>,
    pub sort: Vec<Sort>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// Hint for adapters with an identity map: register fetched rows for
    /// change tracking. Read-only queries leave this off.
    #[serde(default)]
    pub tracked: bool,
}

impl QueryPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter, conjoining with any existing one.
    #[must_use]
    pub fn filtered(mut self, predicate: Predicate) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Appends a sort directive.
    #[must_use]
    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    #[must_use]
    pub fn skip(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn take(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Marks fetched rows for change tracking.
    #[must_use]
    pub fn tracked(mut self) -> Self {
        self.tracked = true;
        self
    }
}
