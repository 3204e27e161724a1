//! API credentials and HMAC primitives shared by the venue signers

use crate::errors::{ExchangeError, Result};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512, Digest};
use std::fmt;

type HmacSha512 = Hmac<Sha512>;

/// API key pair for one venue
///
/// Owned by the driver and moved into a client; `Debug` never prints the
/// secret.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Load `<PREFIX>_API_KEY` and `<PREFIX>_API_SECRET`
    pub fn from_env(prefix: &str) -> Result<Self> {
        let key_var = format!("{prefix}_API_KEY");
        let secret_var = format!("{prefix}_API_SECRET");
        let key = std::env::var(&key_var).map_err(|_| ExchangeError::MissingCredentials(key_var))?;
        let secret = std::env::var(&secret_var).map_err(|_| ExchangeError::MissingCredentials(secret_var))?;
        Ok(Self::new(key, secret))
    }

    pub fn is_valid(&self) -> bool {
        !self.key.is_empty() && !self.secret.is_empty()
    }

    /// Fail with `InvalidCredentials` unless both parts are set
    pub fn require(&self) -> Result<&Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(ExchangeError::InvalidCredentials)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// HMAC-SHA512 of `payload` under `key`
pub fn hmac_sha512(key: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| ExchangeError::SigningError(format!("HMAC setup failed: {e}")))?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn sha256(payload: &[u8]) -> Vec<u8> {
    Sha256::digest(payload).to_vec()
}

/// `k1=v1&k2=v2` with values url-encoded, in the given order
pub fn form_encode(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
