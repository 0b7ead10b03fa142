//! Shared test fixture: an in-memory executor over integer-keyed rows.
//!
//! Evaluates the tagged predicate tree against the `id` field and honors
//! sort/offset/limit, so engine tests exercise the same plan shapes a real
//! adapter would receive. Call counters let tests assert round-trip counts.

#![allow(dead_code)]

use async_trait::async_trait;
use keel_query::{Compare, Predicate, QueryPlan, StoreResult, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
}

pub struct MemoryExecutor {
    ids: Vec<i64>,
    pub count_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl MemoryExecutor {
    pub fn with_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            count_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Rows with ids `1..=n`.
    pub fn sequential(n: i64) -> Self {
        Self::with_ids(1..=n)
    }

    fn matching(&self, filter: Option<&Predicate>) -> Vec<i64> {
        self.ids
            .iter()
            .copied()
            .filter(|id| filter.is_none_or(|p| matches(p, *id)))
            .collect()
    }
}

fn matches(predicate: &Predicate, id: i64) -> bool {
    match predicate {
        Predicate::Cmp(c) => {
            assert_eq!(c.field, "id", "fixture only models the id field");
            let Value::Int(v) = &c.value else {
                panic!("fixture only models integer keys, got {:?}", c.value);
            };
            match c.op {
                Compare::Eq => id == *v,
                Compare::Ne => id != *v,
                Compare::Lt => id < *v,
                Compare::Le => id <= *v,
                Compare::Gt => id > *v,
                Compare::Ge => id >= *v,
            }
        }
        Predicate::All(ps) => ps.iter().all(|p| matches(p, id)),
        Predicate::Any(ps) => ps.iter().any(|p| matches(p, id)),
        Predicate::Not(p) => !matches(p, id),
    }
}

#[async_trait]
impl keel_query::QueryExecutor<Row> for MemoryExecutor {
    async fn count(&self, filter: Option<&Predicate>) -> StoreResult<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.matching(filter).len() as u64)
    }

    async fn fetch(&self, plan: &QueryPlan) -> StoreResult<Vec<Row>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let mut ids = self.matching(plan.filter.as_ref());
        if let Some(sort) = plan.sort.first() {
            assert_eq!(sort.field, "id", "fixture only sorts by id");
            ids.sort_unstable();
            if !sort.ascending {
                ids.reverse();
            }
        }
        let skipped = plan.offset.unwrap_or(0) as usize;
        let taken = plan.limit.map_or(usize::MAX, |l| l as usize);
        Ok(ids
            .into_iter()
            .skip(skipped)
            .take(taken)
            .map(|id| Row { id })
            .collect())
    }
}

pub fn ids(rows: &[Row]) -> Vec<i64> {
    rows.iter().map(|r| r.id).collect()
}
