//! Ambient request context: current time and current actor.
//!
//! The core never reads the wall clock or an authenticated principal
//! directly; both come through this contract so audit stamping and token
//! expiry are deterministic under test.

use chrono::{DateTime, Utc};

/// Collaborator contract supplying the current UTC timestamp and the
/// identifier of the acting user, if any.
pub trait AmbientContext: Send + Sync {
    /// Returns the current UTC timestamp.
    fn utc_now(&self) -> DateTime<Utc>;

    /// Returns the current user identifier, or `None` outside an
    /// authenticated request (background jobs, migrations).
    fn current_user_id(&self) -> Option<String>;
}

/// Wall-clock context with no actor. Suitable for tools and background
/// work; request-scoped hosts supply their own implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemContext;

impl AmbientContext for SystemContext {
    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn current_user_id(&self) -> Option<String> {
        None
    }
}
