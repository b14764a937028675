//! Signing key derivation.
//!
//! - [Derive a signing key](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#derive-signing-key)

use std::fmt::{Debug, Formatter};
use std::sync::{Mutex, PoisonError};

use log::debug;
use sigv4kit_core::hash::{hex_sha256, hmac_sha256, SHA256_OUTPUT_LEN};
use sigv4kit_core::Result;

use crate::constants::{SCOPE_TERMINATOR, SECRET_KEY_PREFIX};

/// Signing key scoped to one (date, region, service, secret) tuple.
///
/// Never equal to the secret it was derived from.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey([u8; SHA256_OUTPUT_LEN]);

impl SigningKey {
    /// Derive the signing key by chaining HMAC-SHA256 over the scope.
    ///
    /// ```text
    /// kDate    = HMAC("AWS4" + secret, date)
    /// kRegion  = HMAC(kDate, region)
    /// kService = HMAC(kRegion, service)
    /// kSigning = HMAC(kService, "aws4_request")
    /// ```
    pub fn derive(secret: &str, date: &str, region: &str, service: &str) -> Result<Self> {
        // Sign secret
        let secret = format!("{SECRET_KEY_PREFIX}{secret}");
        // Sign date
        let sign_date = hmac_sha256(secret.as_bytes(), date.as_bytes())?;
        // Sign region
        let sign_region = hmac_sha256(&sign_date, region.as_bytes())?;
        // Sign service
        let sign_service = hmac_sha256(&sign_region, service.as_bytes())?;
        // Sign request
        let sign_request = hmac_sha256(&sign_service, SCOPE_TERMINATOR.as_bytes())?;

        Ok(SigningKey(sign_request))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey")
    }
}

/// Remembers the most recently derived signing key.
///
/// A hit requires the full tuple to match, so a new UTC day, region,
/// service or secret always derives a fresh key.
#[derive(Default)]
pub(crate) struct SigningKeyCache {
    last: Mutex<Option<CachedKey>>,
}

struct CachedKey {
    date: String,
    region: String,
    service: String,
    secret_digest: String,
    key: SigningKey,
}

impl SigningKeyCache {
    pub(crate) fn get_or_derive(
        &self,
        secret: &str,
        date: &str,
        region: &str,
        service: &str,
    ) -> Result<SigningKey> {
        let secret_digest = hex_sha256(secret.as_bytes());

        // The cached value is always written whole, a poisoned lock still holds a valid entry.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = last.as_ref() {
            if cached.date == date
                && cached.region == region
                && cached.service == service
                && cached.secret_digest == secret_digest
            {
                return Ok(cached.key.clone());
            }
        }

        debug!("deriving signing key for scope {date}/{region}/{service}");
        let key = SigningKey::derive(secret, date, region, service)?;
        *last = Some(CachedKey {
            date: date.to_string(),
            region: region.to_string(),
            service: service.to_string(),
            secret_digest,
            key: key.clone(),
        });
        Ok(key)
    }
}

impl Debug for SigningKeyCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKeyCache")
    }
}
