//! Audit and soft-delete stamping for both write paths.
//!
//! The tracked path mutates pending entity instances just before a commit.
//! The bulk path has no instances to mutate, so it appends property-setter
//! instructions instead, and re-issues a soft delete as a bulk update
//! against the same predicate. Whichever path touched a row, the observable
//! field values come out the same.

use crate::caps::{Entity, descriptor_of};
use crate::store::{BulkKind, BulkOp, RowOp, Setter};
use keel_query::{Predicate, Value};
use keel_types::AmbientContext;
use std::sync::Arc;
use tracing::debug;

/// Stamps lifecycle fields onto pending row operations (tracked path) and
/// property-setter lists (bulk path).
pub struct LifecycleProcessor {
    context: Arc<dyn AmbientContext>,
}

impl LifecycleProcessor {
    #[must_use]
    pub fn new(context: Arc<dyn AmbientContext>) -> Self {
        Self { context }
    }

    /// Tracked path: invoked once before a commit.
    ///
    /// Inserts receive creation stamps; updates receive update stamps and
    /// never have their creation stamps rewritten (the creation hook is
    /// simply not invoked for them). Deletes of soft-deletable types are
    /// converted into updates carrying the deletion flag and, for
    /// auditable types, an update stamp, since a soft delete is itself an
    /// update.
    #[must_use]
    pub fn process_tracked<E: Entity>(&self, ops: Vec<RowOp<E>>) -> Vec<RowOp<E>> {
        let descriptor = descriptor_of::<E>();
        let now = self.context.utc_now();
        let actor = self.context.current_user_id();
        let actor = actor.as_deref();

        ops.into_iter()
            .map(|op| match op {
                RowOp::Insert(mut entity) => {
                    if let Some(audit) = &descriptor.audit {
                        (audit.stamp_created)(&mut entity, now, actor);
                    }
                    RowOp::Insert(entity)
                }
                RowOp::Update(mut entity) => {
                    if let Some(audit) = &descriptor.audit {
                        (audit.stamp_updated)(&mut entity, now, actor);
                    }
                    RowOp::Update(entity)
                }
                RowOp::Delete(mut entity) => {
                    if let Some(soft) = &descriptor.soft_delete {
                        (soft.mark_deleted)(&mut entity, now);
                        if let Some(audit) = &descriptor.audit {
                            (audit.stamp_updated)(&mut entity, now, actor);
                        }
                        debug!("tracked delete converted to soft-delete update");
                        RowOp::Update(entity)
                    } else {
                        RowOp::Delete(entity)
                    }
                }
            })
            .collect()
    }

    /// Bulk path, update flavor: appends update stamps to a caller-supplied
    /// setter list when the type is auditable.
    pub fn append_bulk_update_setters<E: Entity>(&self, setters: &mut Vec<Setter>) {
        let descriptor = descriptor_of::<E>();
        if let Some(audit) = &descriptor.audit {
            let now = self.context.utc_now();
            let actor = self.context.current_user_id();
            setters.push(Setter::new(audit.fields.updated_at, Value::Timestamp(now)));
            setters.push(Setter::new(
                audit.fields.updated_by,
                actor.map_or(Value::Null, Value::Text),
            ));
        }
    }

    /// Bulk path, delete flavor: a soft-deletable type's bulk delete is
    /// re-issued as a bulk update against the same predicate, unless the
    /// caller forces a physical delete.
    #[must_use]
    pub fn plan_bulk_delete<E: Entity>(
        &self,
        filter: Option<Predicate>,
        force_physical: bool,
    ) -> BulkOp {
        let descriptor = descriptor_of::<E>();
        match &descriptor.soft_delete {
            Some(soft) if !force_physical => {
                let now = self.context.utc_now();
                let mut setters = vec![
                    Setter::new(soft.fields.is_deleted, Value::Bool(true)),
                    Setter::new(soft.fields.deleted_at, Value::Timestamp(now)),
                ];
                self.append_bulk_update_setters::<E>(&mut setters);
                debug!("bulk delete re-issued as soft-delete update");
                BulkOp {
                    filter,
                    kind: BulkKind::Update(setters),
                }
            }
            _ => BulkOp {
                filter,
                kind: BulkKind::Delete,
            },
        }
    }
}
