//! Shared test fixtures: a controllable context, two entity types (one
//! with both lifecycle capabilities, one with none), and an in-memory
//! backend that honestly evaluates plans, setters, and row operations.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::StreamExt;
use futures::stream::BoxStream;
use keel_query::{Compare, Predicate, QueryPlan, StoreResult, Value};
use keel_repo::{BulkKind, BulkOp, Entity, EntityDescriptor, RowOp, StoreBackend};
use keel_types::{AmbientContext, Auditable, SoftDelete};
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Context ──────────────────────────────────────────────────────

pub struct FakeContext {
    now: Mutex<DateTime<Utc>>,
    user: Option<String>,
}

impl FakeContext {
    pub fn new() -> Arc<Self> {
        Self::with_user("auditor-7")
    }

    pub fn with_user(user: &str) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 5, 2, 18, 40, 0).unwrap()),
            user: Some(user.to_string()),
        })
    }

    pub fn anonymous() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 5, 2, 18, 40, 0).unwrap()),
            user: None,
        })
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl AmbientContext for FakeContext {
    fn utc_now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn current_user_id(&self) -> Option<String> {
        self.user.clone()
    }
}

// ── Entities ─────────────────────────────────────────────────────

/// Field access by storage name, so the fixture backend can evaluate
/// predicates and apply bulk setters the way a real adapter would.
pub trait FieldAccess {
    fn get_field(&self, field: &str) -> Value;
    fn set_field(&mut self, field: &str, value: Value);
}

/// Auditable + soft-deletable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(id: i64, status: &str) -> Self {
        Self {
            id,
            status: status.to_string(),
            created_at: None,
            created_by: None,
            updated_at: None,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
        }
    }
}

impl Entity for Order {
    type Key = i64;
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> i64 {
        self.id
    }

    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::new().with_audit().with_soft_delete()
    }
}

impl Auditable for Order {
    fn set_created(&mut self, at: DateTime<Utc>, by: Option<&str>) {
        self.created_at = Some(at);
        self.created_by = by.map(str::to_string);
    }

    fn set_updated(&mut self, at: DateTime<Utc>, by: Option<&str>) {
        self.updated_at = Some(at);
        self.updated_by = by.map(str::to_string);
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn updated_by(&self) -> Option<&str> {
        self.updated_by.as_deref()
    }
}

impl SoftDelete for Order {
    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl FieldAccess for Order {
    fn get_field(&self, field: &str) -> Value {
        match field {
            "id" => Value::Int(self.id),
            "status" => Value::Text(self.status.clone()),
            "created_at" => self.created_at.map_or(Value::Null, Value::Timestamp),
            "created_by" => self.created_by.clone().map_or(Value::Null, Value::Text),
            "updated_at" => self.updated_at.map_or(Value::Null, Value::Timestamp),
            "updated_by" => self.updated_by.clone().map_or(Value::Null, Value::Text),
            "is_deleted" => Value::Bool(self.is_deleted),
            "deleted_at" => self.deleted_at.map_or(Value::Null, Value::Timestamp),
            other => panic!("Order has no field {other}"),
        }
    }

    fn set_field(&mut self, field: &str, value: Value) {
        match (field, value) {
            ("status", Value::Text(s)) => self.status = s,
            ("updated_at", Value::Timestamp(ts)) => self.updated_at = Some(ts),
            ("updated_by", Value::Text(u)) => self.updated_by = Some(u),
            ("updated_by", Value::Null) => self.updated_by = None,
            ("is_deleted", Value::Bool(b)) => self.is_deleted = b,
            ("deleted_at", Value::Timestamp(ts)) => self.deleted_at = Some(ts),
            (other, value) => panic!("Order cannot set {other} to {value:?}"),
        }
    }
}

/// Entity with no lifecycle capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub id: i64,
    pub message: String,
}

impl LogLine {
    pub fn new(id: i64, message: &str) -> Self {
        Self {
            id,
            message: message.to_string(),
        }
    }
}

impl Entity for LogLine {
    type Key = i64;
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> i64 {
        self.id
    }

    fn descriptor() -> EntityDescriptor<Self> {
        EntityDescriptor::new()
    }
}

impl FieldAccess for LogLine {
    fn get_field(&self, field: &str) -> Value {
        match field {
            "id" => Value::Int(self.id),
            "message" => Value::Text(self.message.clone()),
            other => panic!("LogLine has no field {other}"),
        }
    }

    fn set_field(&mut self, field: &str, value: Value) {
        match (field, value) {
            ("message", Value::Text(s)) => self.message = s,
            (other, value) => panic!("LogLine cannot set {other} to {value:?}"),
        }
    }
}

// ── Predicate evaluation ─────────────────────────────────────────

fn value_cmp(a: &Value, b: &Value) -> Option<CmpOrdering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(CmpOrdering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.partial_cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.partial_cmp(y),
        (Value::Uuid(x), Value::Uuid(y)) => x.partial_cmp(y),
        _ => None,
    }
}

pub fn matches<E: FieldAccess>(predicate: &Predicate, entity: &E) -> bool {
    match predicate {
        Predicate::Cmp(c) => {
            let Some(ord) = value_cmp(&entity.get_field(&c.field), &c.value) else {
                return false;
            };
            match c.op {
                Compare::Eq => ord == CmpOrdering::Equal,
                Compare::Ne => ord != CmpOrdering::Equal,
                Compare::Lt => ord == CmpOrdering::Less,
                Compare::Le => ord != CmpOrdering::Greater,
                Compare::Gt => ord == CmpOrdering::Greater,
                Compare::Ge => ord != CmpOrdering::Less,
            }
        }
        Predicate::All(ps) => ps.iter().all(|p| matches(p, entity)),
        Predicate::Any(ps) => ps.iter().any(|p| matches(p, entity)),
        Predicate::Not(p) => !matches(p, entity),
    }
}

// ── Backend ──────────────────────────────────────────────────────

/// In-memory store honoring plans, row operations, and bulk writes, with
/// call counters for round-trip assertions.
pub struct MemoryBackend<E> {
    rows: Mutex<Vec<E>>,
    pub fetch_calls: AtomicUsize,
    pub count_calls: AtomicUsize,
    pub apply_calls: AtomicUsize,
    pub bulk_calls: AtomicUsize,
    /// Rows actually yielded through `stream`, counted at poll time.
    pub streamed_rows: AtomicUsize,
}

impl<E: Entity + FieldAccess + Clone> MemoryBackend<E>
where
    E::Key: PartialEq,
{
    pub fn new() -> Self {
        Self::seeded(Vec::new())
    }

    pub fn seeded(rows: Vec<E>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fetch_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            apply_calls: AtomicUsize::new(0),
            bulk_calls: AtomicUsize::new(0),
            streamed_rows: AtomicUsize::new(0),
        }
    }

    pub fn rows(&self) -> Vec<E> {
        self.rows.lock().unwrap().clone()
    }

    pub fn row(&self, key: E::Key) -> Option<E> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.key() == key)
            .cloned()
    }

    fn select(&self, plan: &QueryPlan) -> Vec<E> {
        let rows = self.rows.lock().unwrap();
        let mut hits: Vec<E> = rows
            .iter()
            .filter(|r| plan.filter.as_ref().is_none_or(|p| matches(p, *r)))
            .cloned()
            .collect();
        if let Some(sort) = plan.sort.first() {
            hits.sort_by(|a, b| {
                let ord = value_cmp(&a.get_field(&sort.field), &b.get_field(&sort.field))
                    .unwrap_or(CmpOrdering::Equal);
                if sort.ascending { ord } else { ord.reverse() }
            });
        }
        let skipped = plan.offset.unwrap_or(0) as usize;
        let taken = plan.limit.map_or(usize::MAX, |l| l as usize);
        hits.into_iter().skip(skipped).take(taken).collect()
    }
}

#[async_trait]
impl<E> StoreBackend<E> for MemoryBackend<E>
where
    E: Entity + FieldAccess + Clone,
    E::Key: PartialEq,
{
    async fn fetch(&self, plan: &QueryPlan) -> StoreResult<Vec<E>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.select(plan))
    }

    async fn count(&self, filter: Option<&Predicate>) -> StoreResult<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| filter.is_none_or(|p| matches(p, *r)))
            .count() as u64)
    }

    fn stream(&self, plan: QueryPlan) -> BoxStream<'_, StoreResult<E>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        // Rows are selected up front, but each one crosses the stream
        // lazily; `streamed_rows` advances only when a row is polled out.
        futures::stream::iter(self.select(&plan))
            .map(|row| {
                self.streamed_rows.fetch_add(1, Ordering::SeqCst);
                Ok(row)
            })
            .boxed()
    }

    async fn apply(&self, ops: Vec<RowOp<E>>) -> StoreResult<()> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        for op in ops {
            match op {
                RowOp::Insert(e) => rows.push(e),
                RowOp::Update(e) => {
                    let key = e.key();
                    if let Some(slot) = rows.iter_mut().find(|r| r.key() == key) {
                        *slot = e;
                    }
                }
                RowOp::Delete(e) => {
                    let key = e.key();
                    rows.retain(|r| r.key() != key);
                }
            }
        }
        Ok(())
    }

    async fn execute_bulk(&self, op: BulkOp) -> StoreResult<u64> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        match op.kind {
            BulkKind::Update(setters) => {
                let mut affected = 0;
                for row in rows
                    .iter_mut()
                    .filter(|r| op.filter.as_ref().is_none_or(|p| matches(p, *r)))
                {
                    for setter in &setters {
                        row.set_field(&setter.field, setter.value.clone());
                    }
                    affected += 1;
                }
                Ok(affected)
            }
            BulkKind::Delete => {
                let before = rows.len();
                rows.retain(|r| !op.filter.as_ref().is_none_or(|p| matches(p, r)));
                Ok((before - rows.len()) as u64)
            }
        }
    }
}

// Delegation so a test can move the backend into a repository while
// keeping a handle to its rows and call counters. Written per entity
// type (not `impl<E>`) because a generic impl of the foreign trait for
// `Arc<_>` would leave `E` uncovered and violate the orphan rule.
macro_rules! impl_arc_backend {
    ($entity:ty) => {
        #[async_trait]
        impl StoreBackend<$entity> for Arc<MemoryBackend<$entity>> {
            async fn fetch(&self, plan: &QueryPlan) -> StoreResult<Vec<$entity>> {
                self.as_ref().fetch(plan).await
            }

            async fn count(&self, filter: Option<&Predicate>) -> StoreResult<u64> {
                self.as_ref().count(filter).await
            }

            fn stream(&self, plan: QueryPlan) -> BoxStream<'_, StoreResult<$entity>> {
                self.as_ref().stream(plan)
            }

            async fn apply(&self, ops: Vec<RowOp<$entity>>) -> StoreResult<()> {
                self.as_ref().apply(ops).await
            }

            async fn execute_bulk(&self, op: BulkOp) -> StoreResult<u64> {
                self.as_ref().execute_bulk(op).await
            }
        }
    };
}

impl_arc_backend!(Order);
impl_arc_backend!(LogLine);
