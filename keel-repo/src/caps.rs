//! Entity contract and the process-wide capability registry.
//!
//! Whether an entity type is auditable or soft-deletable never changes for
//! the life of the process, yet is consulted on every write. Each type's
//! [`EntityDescriptor`] is therefore computed once and cached in a
//! process-wide registry keyed by `TypeId`; the first writer wins and every
//! later session reads the same entry.

use chrono::{DateTime, Utc};
use keel_query::Value;
use keel_types::{Auditable, SoftDelete};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// A persistable entity type.
pub trait Entity: Send + Sync + 'static {
    /// Primary key type, convertible into a query [`Value`].
    type Key: Clone + Into<Value> + Send + Sync;

    /// Storage field name of the primary key.
    const KEY_FIELD: &'static str;

    /// Returns this row's key.
    fn key(&self) -> Self::Key;

    /// Declares the type's lifecycle capabilities. Called once per process
    /// per type; the result is cached in the registry.
    fn descriptor() -> EntityDescriptor<Self>
    where
        Self: Sized;
}

/// Storage field names stamped by the bulk update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditFields {
    pub updated_at: &'static str,
    pub updated_by: &'static str,
}

impl Default for AuditFields {
    fn default() -> Self {
        Self {
            updated_at: "updated_at",
            updated_by: "updated_by",
        }
    }
}

/// Storage field names stamped by the bulk soft-delete path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftDeleteFields {
    pub is_deleted: &'static str,
    pub deleted_at: &'static str,
}

impl Default for SoftDeleteFields {
    fn default() -> Self {
        Self {
            is_deleted: "is_deleted",
            deleted_at: "deleted_at",
        }
    }
}

pub(crate) struct AuditHooks<E> {
    pub stamp_created: fn(&mut E, DateTime<Utc>, Option<&str>),
    pub stamp_updated: fn(&mut E, DateTime<Utc>, Option<&str>),
    pub fields: AuditFields,
}

pub(crate) struct SoftDeleteHooks<E> {
    pub mark_deleted: fn(&mut E, DateTime<Utc>),
    pub fields: SoftDeleteFields,
}

/// Lifecycle capabilities of one entity type: which stamps apply and which
/// storage fields the bulk path writes them to.
///
/// Capabilities are declared, not inferred: `with_audit` only compiles for
/// types implementing [`Auditable`], `with_soft_delete` for types
/// implementing [`SoftDelete`], so a declaration cannot outrun the traits.
pub struct EntityDescriptor<E> {
    pub(crate) audit: Option<AuditHooks<E>>,
    pub(crate) soft_delete: Option<SoftDeleteHooks<E>>,
}

impl<E: Entity> EntityDescriptor<E> {
    /// A type with no lifecycle capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            audit: None,
            soft_delete: None,
        }
    }

    /// Declares audit stamping with the default field names.
    #[must_use]
    pub fn with_audit(self) -> Self
    where
        E: Auditable,
    {
        self.with_audit_fields(AuditFields::default())
    }

    /// Declares audit stamping with explicit storage field names.
    #[must_use]
    pub fn with_audit_fields(mut self, fields: AuditFields) -> Self
    where
        E: Auditable,
    {
        self.audit = Some(AuditHooks {
            stamp_created: |e, at, by| e.set_created(at, by),
            stamp_updated: |e, at, by| e.set_updated(at, by),
            fields,
        });
        self
    }

    /// Declares soft deletion with the default field names.
    #[must_use]
    pub fn with_soft_delete(self) -> Self
    where
        E: SoftDelete,
    {
        self.with_soft_delete_fields(SoftDeleteFields::default())
    }

    /// Declares soft deletion with explicit storage field names.
    #[must_use]
    pub fn with_soft_delete_fields(mut self, fields: SoftDeleteFields) -> Self
    where
        E: SoftDelete,
    {
        self.soft_delete = Some(SoftDeleteHooks {
            mark_deleted: |e, at| e.mark_deleted(at),
            fields,
        });
        self
    }
}

impl<E: Entity> Default for EntityDescriptor<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability flags of an entity type, as cached in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caps {
    pub auditable: bool,
    pub soft_delete: bool,
}

static REGISTRY: OnceLock<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> = OnceLock::new();

/// Returns the cached descriptor for `E`, computing it on first use.
///
/// Safe for concurrent population from multiple sessions: when two threads
/// race on the same uncached type, the first entry wins and both observe it.
#[must_use]
pub fn descriptor_of<E: Entity>() -> Arc<EntityDescriptor<E>> {
    let registry = REGISTRY.get_or_init(|| RwLock::new(HashMap::new()));
    let type_id = TypeId::of::<E>();

    if let Some(cached) = registry
        .read()
        .expect("capability registry lock poisoned")
        .get(&type_id)
    {
        return Arc::clone(cached)
            .downcast::<EntityDescriptor<E>>()
            .expect("capability registry entry has the keyed type");
    }

    let fresh: Arc<dyn Any + Send + Sync> = Arc::new(E::descriptor());
    let mut map = registry
        .write()
        .expect("capability registry lock poisoned");
    let entry = map.entry(type_id).or_insert(fresh);
    Arc::clone(entry)
        .downcast::<EntityDescriptor<E>>()
        .expect("capability registry entry has the keyed type")
}

/// Returns the cached capability flags for `E`.
#[must_use]
pub fn caps_of<E: Entity>() -> Caps {
    let descriptor = descriptor_of::<E>();
    Caps {
        auditable: descriptor.audit.is_some(),
        soft_delete: descriptor.soft_delete.is_some(),
    }
}
