//! Entity capability traits.
//!
//! Capabilities are independent narrow traits, not a base type: any entity
//! may implement zero, one, or both. The lifecycle processor in `keel-repo`
//! consults an entity's descriptor to decide which stamps apply; these
//! traits only define how the stamps reach the fields.

use chrono::{DateTime, Utc};

/// Capability for entities carrying creation/update audit fields.
///
/// `set_created` is applied exactly once, at insert; the lifecycle
/// processor never re-applies it on update.
pub trait Auditable {
    /// Stamps the creation timestamp and actor.
    fn set_created(&mut self, at: DateTime<Utc>, by: Option<&str>);

    /// Stamps the last-update timestamp and actor.
    fn set_updated(&mut self, at: DateTime<Utc>, by: Option<&str>);

    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn created_by(&self) -> Option<&str>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
    fn updated_by(&self) -> Option<&str>;
}

/// Capability for entities deleted by flag rather than by row removal.
pub trait SoftDelete {
    /// Marks the entity deleted at `at`.
    fn mark_deleted(&mut self, at: DateTime<Utc>);

    fn is_deleted(&self) -> bool;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
}
