//! The codec contract and the plain (unsigned) implementation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};

/// Encodes and decodes cursor values to and from opaque string tokens.
///
/// `decode` never raises: every rejection path (malformed base64, invalid
/// JSON, bad signature, stale version, expiry) yields `None`, so callers
/// cannot distinguish an attack from an absent cursor.
pub trait CursorCodec: Send + Sync {
    /// Serializes `value` into a token. Returns `None` only when the value
    /// itself cannot be serialized, which indicates a non-serializable key
    /// type rather than a runtime condition.
    fn encode<T: Serialize>(&self, value: &T) -> Option<String>;

    /// Deserializes a token back into a value, or `None` when the token is
    /// not acceptable for any reason.
    fn decode<T: DeserializeOwned>(&self, token: &str) -> Option<T>;
}

/// Reversible base64url(JSON) codec with no integrity or expiry guarantee.
///
/// Anyone holding a token can read and forge it. Use only in development
/// and tests; production surfaces use [`SignedCursorCodec`](crate::SignedCursorCodec).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCursorCodec;

impl PlainCursorCodec {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CursorCodec for PlainCursorCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Option<String> {
        let json = serde_json::to_vec(value).ok()?;
        Some(URL_SAFE_NO_PAD.encode(json))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        let json = URL_SAFE_NO_PAD.decode(token).ok()?;
        serde_json::from_slice(&json).ok()
    }
}
