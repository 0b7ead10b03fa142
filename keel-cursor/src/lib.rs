//! Opaque cursor token codecs for Keel.
//!
//! A cursor is a position in a sorted result set, handed to callers as an
//! opaque string so they can fetch the next or previous page without an
//! offset scan, and without being able to construct positions themselves.
//!
//! Two codecs ship here:
//! - [`PlainCursorCodec`]: reversible base64(JSON) with no integrity or
//!   expiry guarantee. Development and tests only.
//! - [`SignedCursorCodec`]: versioned, HMAC-SHA256-signed, optionally
//!   expiring. The one to expose publicly.
//!
//! Decoding never fails loudly: a malformed, tampered, wrong-version, or
//! expired token decodes to `None`, exactly like a missing token, so a
//! caller probing with forged tokens learns nothing.

mod codec;
mod signed;

pub use codec::{CursorCodec, PlainCursorCodec};
pub use signed::{CursorConfigError, SignedCursorCodec, SigningConfig, CURSOR_VERSION};
