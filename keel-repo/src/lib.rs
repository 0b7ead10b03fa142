//! Repository facade and write lifecycle for Keel.
//!
//! This crate ties the core together: the [`StoreBackend`] contract an
//! adapter implements over its relational engine, the [`LifecycleProcessor`]
//! that stamps audit and soft-delete fields on both write paths, the
//! process-wide entity capability registry, and the [`Repository`] facade
//! application code talks to.
//!
//! The two write paths, per-row tracked ops committed by `save_changes`
//! and set-based bulk ops that never materialize rows, share no runtime
//! hook, so the lifecycle processor is the single place both are kept
//! behaviorally identical: a row soft-deleted through either path ends up
//! with the same flag, timestamps, and actor.

mod caps;
mod lifecycle;
mod repository;
mod store;

pub use caps::{AuditFields, Caps, Entity, EntityDescriptor, SoftDeleteFields, caps_of, descriptor_of};
pub use lifecycle::LifecycleProcessor;
pub use repository::Repository;
pub use store::{BulkKind, BulkOp, RowOp, Setter, StoreBackend};

pub use keel_query::{StoreError, StoreResult};
