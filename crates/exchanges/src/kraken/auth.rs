//! Kraken request signing
//!
//! `API-Sign = base64(HMAC-SHA512(uri_path ‖ SHA256(nonce ‖ post_data), base64_decode(secret)))`

use crate::auth::{Credentials, hmac_sha512, sha256};
use crate::errors::{ExchangeError, Result};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub struct KrakenSigner {
    credentials: Credentials,
    secret: Vec<u8>,
}

impl KrakenSigner {
    /// Fails with `InvalidCredentials` when the secret is not base64
    pub fn new(credentials: Credentials) -> Result<Self> {
        credentials.require()?;
        let secret = STANDARD
            .decode(credentials.secret.as_bytes())
            .map_err(|_| ExchangeError::InvalidCredentials)?;
        Ok(Self { credentials, secret })
    }

    pub fn api_key(&self) -> &str {
        &self.credentials.key
    }

    /// Signature for `post_data` (which already contains `nonce=<nonce>`)
    pub fn sign(&self, uri_path: &str, nonce: &str, post_data: &str) -> Result<String> {
        let mut message = uri_path.as_bytes().to_vec();
        message.extend_from_slice(&sha256(format!("{nonce}{post_data}").as_bytes()));
        Ok(STANDARD.encode(hmac_sha512(&self.secret, &message)?))
    }
}
