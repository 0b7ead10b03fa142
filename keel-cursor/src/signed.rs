//! Signed, versioned, expiring cursor tokens.
//!
//! Token format: `base64url(payload_json).base64url(hmac_sha256)`
//!
//! The payload is a JSON object `{"v": <version>, "d": <data>, "exp":
//! <unix-seconds|null>}`. The signature covers the *encoded* payload
//! segment (the base64url string bytes, not the decoded JSON), and the
//! token splits on the last `.`; base64 guarantees neither segment
//! contains one, but key material handed in by adapters must not depend
//! on that.

use crate::codec::CursorCodec;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Duration;
use hmac::{Hmac, Mac};
use keel_types::AmbientContext;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Current cursor payload schema version. Tokens carrying any other
/// version are rejected, signature notwithstanding.
pub const CURSOR_VERSION: u32 = 1;

/// Configuration for [`SignedCursorCodec`].
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Secret signing key. Must be non-empty.
    pub key: String,
    /// Default token lifetime. `None` means tokens never expire.
    pub default_ttl: Option<Duration>,
}

impl SigningConfig {
    /// Config with no expiry.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_ttl: None,
        }
    }

    /// Config with a default token lifetime.
    #[must_use]
    pub fn with_ttl(key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            default_ttl: Some(ttl),
        }
    }
}

/// Construction-time configuration errors.
#[derive(Debug, Error)]
pub enum CursorConfigError {
    /// An empty signing key would make every token forgeable.
    #[error("cursor signing key must not be empty")]
    EmptyKey,
}

#[derive(Debug, Serialize, Deserialize)]
struct Payload<T> {
    v: u32,
    d: T,
    exp: Option<i64>,
}

/// HMAC-SHA256-signed cursor codec with schema versioning and optional
/// expiry. Stateless per call; safe for concurrent use.
pub struct SignedCursorCodec {
    key: Vec<u8>,
    default_ttl: Option<Duration>,
    context: Arc<dyn AmbientContext>,
}

impl SignedCursorCodec {
    /// Builds a codec from `config`, reading the clock through `context`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorConfigError::EmptyKey`] when the signing key is
    /// empty, failing fast instead of issuing forgeable tokens.
    pub fn new(
        config: SigningConfig,
        context: Arc<dyn AmbientContext>,
    ) -> Result<Self, CursorConfigError> {
        if config.key.is_empty() {
            return Err(CursorConfigError::EmptyKey);
        }
        Ok(Self {
            key: config.key.into_bytes(),
            default_ttl: config.default_ttl,
            context,
        })
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.key).expect("HMAC key of any length is valid")
    }

    fn sign(&self, payload_b64: &str) -> String {
        let mut mac = self.mac();
        mac.update(payload_b64.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

impl CursorCodec for SignedCursorCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Option<String> {
        let exp = self
            .default_ttl
            .map(|ttl| (self.context.utc_now() + ttl).timestamp());
        let payload = Payload {
            v: CURSOR_VERSION,
            d: value,
            exp,
        };
        let json = serde_json::to_vec(&payload).ok()?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(json);
        let sig_b64 = self.sign(&payload_b64);
        Some(format!("{payload_b64}.{sig_b64}"))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Option<T> {
        // Split on the last dot; base64 segments never contain one.
        let (payload_b64, sig_b64) = token.rsplit_once('.')?;

        let provided_sig = URL_SAFE_NO_PAD.decode(sig_b64).ok()?;
        let mut mac = self.mac();
        mac.update(payload_b64.as_bytes());
        // Constant-time comparison; a forged token must cost the same to
        // reject as a merely stale one.
        if mac.verify_slice(&provided_sig).is_err() {
            debug!("cursor token rejected: signature mismatch");
            return None;
        }

        let json = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
        let payload: Payload<T> = serde_json::from_slice(&json).ok()?;

        if payload.v != CURSOR_VERSION {
            debug!(version = payload.v, "cursor token rejected: stale version");
            return None;
        }
        if let Some(exp) = payload.exp {
            if exp < self.context.utc_now().timestamp() {
                debug!("cursor token rejected: expired");
                return None;
            }
        }
        Some(payload.d)
    }
}
