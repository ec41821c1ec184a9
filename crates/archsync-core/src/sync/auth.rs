//! Request signing
//!
//! Every request to the remote store carries an HMAC signature over the
//! method, path, body hash, content type and a nonce:
//!
//! ```text
//! message         = METHOD \n PATH \n CONTENT_HASH \n CONTENT_TYPE \n NONCE \n
//! X-Authorization = {api_key}:{base64(hex(HMAC-SHA256(api_secret, message)))}
//! X-Content-Hash  = hex(SHA-256(body))
//! Nonce           = unix time in milliseconds
//! ```

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::error::SyncError;

type HmacSha256 = Hmac<Sha256>;

pub const AUTHORIZATION_HEADER: &str = "X-Authorization";
pub const NONCE_HEADER: &str = "Nonce";
pub const CONTENT_HASH_HEADER: &str = "X-Content-Hash";

/// API key and secret for the remote store
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_secret.trim().is_empty()
    }

    /// Sign a request, producing the headers to attach
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        content_type: &str,
        nonce: u64,
    ) -> Result<SignedHeaders, SyncError> {
        let content_hash = hex::encode(Sha256::digest(body));
        let message = format!(
            "{}\n{}\n{}\n{}\n{}\n",
            method, path, content_hash, content_type, nonce
        );

        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| SyncError::Authentication(format!("Unusable API secret: {}", e)))?;
        mac.update(message.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(SignedHeaders {
            authorization: format!("{}:{}", self.api_key, BASE64.encode(signature)),
            nonce: nonce.to_string(),
            content_hash,
        })
    }
}

// The secret never appears in logs or debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"****")
            .finish()
    }
}

/// Header values produced by [`Credentials::sign`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub nonce: String,
    pub content_hash: String,
}
