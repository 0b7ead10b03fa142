//! Core type definitions for Keel.
//!
//! This crate defines the fundamental, store-agnostic types used throughout
//! the data-access core:
//! - The `Error` value and `Outcome` railway result type
//! - The `AmbientContext` collaborator contract (clock + current actor)
//! - Entity capability traits (`Auditable`, `SoftDelete`)
//!
//! Everything store-specific (query dialects, connection handling, mapping
//! configuration) belongs in the adapter behind `keel-repo`'s backend
//! contract, not here.

mod context;
mod entity;
mod error;
mod outcome;

pub use context::{AmbientContext, SystemContext};
pub use entity::{Auditable, SoftDelete};
pub use error::{Error, ErrorKind};
pub use outcome::Outcome;
