use std::time::Duration;

use http::header::HeaderName;
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use sigv4kit_core::time::{now, DateTime};
use sigv4kit_core::{Error, Result, SigningRequest};

use crate::canonical::{canonicalize_header, signed_header_names, CanonicalRequest, SigningContext};
use crate::constants::{
    ALGORITHM, CONTENT_SHA_256_REQUIRED, PRESIGN_MAX_EXPIRES_SECS, UNSIGNED_PAYLOAD,
    X_AMZ_ALGORITHM_QUERY, X_AMZ_CONTENT_SHA_256, X_AMZ_CREDENTIAL_QUERY, X_AMZ_DATE_QUERY,
    X_AMZ_EXPIRES_QUERY, X_AMZ_SECURITY_TOKEN, X_AMZ_SECURITY_TOKEN_QUERY,
    X_AMZ_SIGNATURE_QUERY, X_AMZ_SIGNED_HEADERS_QUERY,
};
use crate::credential::{AccessKey, Credential};
use crate::key::SigningKeyCache;
use crate::payload::Payload;
use crate::signature::{authorization_value, compute_signature, insert_authorization, string_to_sign};
use crate::Config;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// A signer without a fixed signing time holds no per-call state and can be
/// shared across threads. Every call reads the clock, derives (or reuses) the
/// signing key for that day and writes only the headers it owns.
#[derive(Debug)]
pub struct RequestSigner {
    service: String,
    region: String,
    double_url_encode: bool,

    time: Option<DateTime>,
    keys: SigningKeyCache,
}

impl RequestSigner {
    /// Create a new signer for AWS V4.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            double_url_encode: true,

            time: None,
            keys: SigningKeyCache::default(),
        }
    }

    /// Create a signer from config.
    ///
    /// Both service and region must be set.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        if cfg.service.is_empty() {
            return Err(Error::config_invalid("service is required"));
        }
        if cfg.region.is_empty() {
            return Err(Error::config_invalid("region is required"));
        }

        Ok(Self::new(&cfg.service, &cfg.region).with_double_url_encode(cfg.double_url_encode))
    }

    /// Encode already percent-encoded paths a second time. Defaults to `true`.
    pub fn with_double_url_encode(mut self, double_url_encode: bool) -> Self {
        self.double_url_encode = double_url_encode;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Set or clear the fixed signing time for all following calls.
    pub fn set_time(&mut self, time: Option<DateTime>) {
        self.time = time;
    }

    /// Get the service of this signer.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Get the region of this signer.
    pub fn region(&self) -> &str {
        &self.region
    }

    fn context(&self) -> Result<SigningContext> {
        if self.service.is_empty() {
            return Err(Error::config_invalid("service is required"));
        }
        if self.region.is_empty() {
            return Err(Error::config_invalid("region is required"));
        }

        Ok(SigningContext {
            service: self.service.clone(),
            region: self.region.clone(),
            time: self.time.unwrap_or_else(now),
            double_url_encode: self.double_url_encode,
        })
    }

    /// Signing request with header.
    ///
    /// Inserts `Host` (unless present), `X-Amz-Date`, `X-Amz-Security-Token`
    /// for session credentials and finally `Authorization`. Anonymous
    /// credentials leave the request untouched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sigv4kit_aws_v4::{Credential, Payload, RequestSigner};
    ///
    /// # fn main() -> sigv4kit_core::Result<()> {
    /// let signer = RequestSigner::new("dynamodb", "us-east-1");
    /// let cred = Credential::new("access_key_id", "secret_access_key");
    ///
    /// let req = http::Request::post("https://dynamodb.us-east-1.amazonaws.com/")
    ///     .header("x-amz-target", "DynamoDB_20120810.ListTables")
    ///     .body(())
    ///     .expect("request must be valid");
    /// let (mut parts, _) = req.into_parts();
    ///
    /// signer.sign(&mut parts, Payload::from("{}"), &cred)?;
    /// assert!(parts.headers.contains_key(http::header::AUTHORIZATION));
    /// # Ok(())
    /// # }
    /// ```
    pub fn sign(&self, req: &mut Parts, payload: Payload<'_>, cred: &Credential) -> Result<()> {
        let key = match cred {
            Credential::Named(key) => key.sanitized(),
            Credential::Anonymous => {
                debug!("credential is anonymous, skipping signing");
                return Ok(());
            }
        };

        let ctx = self.context()?;
        let mut signed_req = SigningRequest::build(req)?;

        // canonicalize context
        canonicalize_header(&mut signed_req, &ctx, true)?;
        insert_security_token(&mut signed_req, &key)?;
        let payload_hash = resolve_payload_hash(&mut signed_req, payload)?;

        let creq = CanonicalRequest::build(&signed_req, &ctx, payload_hash)?;
        debug!("calculated canonical request: {creq}");

        let signature = self.calculate(&ctx, &creq, &key)?;
        let scope = ctx.scope();
        insert_authorization(
            &mut signed_req,
            &authorization_value(&key.access_key_id, &scope, creq.signed_headers(), &signature),
        )?;

        // Apply to the request.
        signed_req.apply(req)
    }

    /// Signing request with query.
    ///
    /// The signature and all its parameters are carried in the query string
    /// so the URI can be handed to clients that can't set headers. The
    /// payload is never part of a presigned signature.
    pub fn sign_query(&self, req: &mut Parts, cred: &Credential, expires_in: Duration) -> Result<()> {
        let key = match cred {
            Credential::Named(key) => key.sanitized(),
            Credential::Anonymous => {
                debug!("credential is anonymous, skipping signing");
                return Ok(());
            }
        };

        if expires_in.as_secs() > PRESIGN_MAX_EXPIRES_SECS {
            return Err(Error::request_invalid(format!(
                "presigned requests are valid for at most 7 days, got {}s",
                expires_in.as_secs()
            )));
        }

        let ctx = self.context()?;
        let mut signed_req = SigningRequest::build(req)?;
        canonicalize_header(&mut signed_req, &ctx, false)?;

        // Drop parameters left over from a previous presign.
        signed_req.query.retain(|(k, _)| {
            ![
                X_AMZ_ALGORITHM_QUERY,
                X_AMZ_CREDENTIAL_QUERY,
                X_AMZ_DATE_QUERY,
                X_AMZ_EXPIRES_QUERY,
                X_AMZ_SIGNED_HEADERS_QUERY,
                X_AMZ_SECURITY_TOKEN_QUERY,
                X_AMZ_SIGNATURE_QUERY,
            ]
            .contains(&k.as_str())
        });

        let signed_headers = signed_header_names(&signed_req).join(";");
        signed_req.query_push(X_AMZ_ALGORITHM_QUERY, ALGORITHM);
        signed_req.query_push(
            X_AMZ_CREDENTIAL_QUERY,
            format!("{}/{}", key.access_key_id, ctx.scope()),
        );
        signed_req.query_push(X_AMZ_DATE_QUERY, ctx.timestamp());
        signed_req.query_push(X_AMZ_EXPIRES_QUERY, expires_in.as_secs().to_string());
        signed_req.query_push(X_AMZ_SIGNED_HEADERS_QUERY, signed_headers);
        if let Some(token) = &key.session_token {
            signed_req.query_push(X_AMZ_SECURITY_TOKEN_QUERY, token);
        }

        let creq = CanonicalRequest::build(&signed_req, &ctx, UNSIGNED_PAYLOAD)?;
        debug!("calculated canonical request: {creq}");

        let signature = self.calculate(&ctx, &creq, &key)?;
        signed_req.set_encoded_query(format!(
            "{}&{}={}",
            creq.query(),
            X_AMZ_SIGNATURE_QUERY,
            signature
        ));

        // Apply to the request.
        signed_req.apply(req)
    }

    /// Calculate the signature of a canonical request.
    fn calculate(&self, ctx: &SigningContext, creq: &CanonicalRequest, key: &AccessKey) -> Result<String> {
        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = ctx.scope();
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(&ctx.timestamp(), &scope, &creq.hash())?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = self.keys.get_or_derive(
            &key.secret_access_key,
            &ctx.date_stamp(),
            &ctx.region,
            &ctx.service,
        )?;
        compute_signature(&signing_key, &string_to_sign)
    }
}

/// Insert X_AMZ_SECURITY_TOKEN header if security token exists.
fn insert_security_token(req: &mut SigningRequest, key: &AccessKey) -> Result<()> {
    if let Some(token) = &key.session_token {
        let mut value = HeaderValue::from_str(token)?;
        // Set token value sensitive to avoid leaking.
        value.set_sensitive(true);

        req.headers
            .insert(HeaderName::from_static(X_AMZ_SECURITY_TOKEN), value);
    }

    Ok(())
}

/// Decide the payload hash of the canonical request.
///
/// A caller supplied `x-amz-content-sha256` wins and the payload is not
/// read at all, unless its value is `required`, in which case the header is
/// filled with the computed hash.
fn resolve_payload_hash(req: &mut SigningRequest, payload: Payload<'_>) -> Result<String> {
    let content_sha256 = HeaderName::from_static(X_AMZ_CONTENT_SHA_256);

    match req.header_get_joined(&content_sha256)? {
        Some(v) if v.trim() != CONTENT_SHA_256_REQUIRED => Ok(v.trim().to_string()),
        Some(_) => {
            let hash = payload.hash()?;
            req.headers
                .insert(content_sha256, HeaderValue::try_from(hash.as_str())?);
            Ok(hash)
        }
        None => {
            let unsigned = matches!(payload, Payload::Unsigned);
            let hash = payload.hash()?;
            if unsigned {
                req.headers
                    .insert(content_sha256, HeaderValue::from_static(UNSIGNED_PAYLOAD));
            }
            Ok(hash)
        }
    }
}
