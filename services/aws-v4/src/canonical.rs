//! Canonical request construction.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)

use std::fmt::{Display, Formatter};

use http::header::{HeaderName, HOST};
use http::HeaderValue;
use percent_encoding::utf8_percent_encode;
use sigv4kit_core::hash::hex_sha256;
use sigv4kit_core::time::{format_date, format_iso8601, DateTime};
use sigv4kit_core::{Error, Result, SigningRequest};

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, SCOPE_TERMINATOR, X_AMZ_DATE};
use crate::header::{host_header_value, needs_sign, normalize_header_value};

/// Everything besides the request and credential that a signature is bound to.
#[derive(Debug, Clone)]
pub struct SigningContext {
    /// Service name, e.g. `s3` or `dynamodb`.
    pub service: String,
    /// Region name, e.g. `us-east-1`.
    pub region: String,
    /// Signing instant.
    pub time: DateTime,
    /// Encode already percent-encoded paths once more.
    pub double_url_encode: bool,
}

impl SigningContext {
    /// Date stamp of the signing instant: `19810216`
    pub fn date_stamp(&self) -> String {
        format_date(self.time)
    }

    /// Full timestamp of the signing instant: `19810216T063000Z`
    pub fn timestamp(&self) -> String {
        format_iso8601(self.time)
    }

    /// Credential scope: `19810216/us-east-1/demo/aws4_request`
    pub fn scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date_stamp(),
            self.region,
            self.service,
            SCOPE_TERMINATOR
        )
    }
}

/// Insert the headers every signed request carries.
///
/// A caller supplied `Host` always wins over the one derived from the URI.
/// The date header is only written for header signing; presigned requests
/// carry the timestamp in the query instead.
pub(crate) fn canonicalize_header(
    req: &mut SigningRequest,
    ctx: &SigningContext,
    with_date: bool,
) -> Result<()> {
    if !req.headers.contains_key(HOST) {
        let authority = req.authority.as_ref().ok_or_else(|| {
            Error::config_invalid("request without host header or authority can't be signed")
        })?;
        let host = HeaderValue::try_from(host_header_value(&req.scheme, authority))?;
        req.headers.insert(HOST, host);
    }

    if with_date {
        req.headers.insert(
            HeaderName::from_static(X_AMZ_DATE),
            HeaderValue::try_from(ctx.timestamp())?,
        );
    }

    Ok(())
}

/// Sorted, lower-cased names of the headers that will be signed.
pub(crate) fn signed_header_names(req: &SigningRequest) -> Vec<&str> {
    let mut names = req
        .headers
        .keys()
        .map(|k| k.as_str())
        .filter(|k| needs_sign(k))
        .collect::<Vec<_>>();
    names.sort_unstable();
    names
}

/// Normalized, ordered form of a request.
#[derive(Debug)]
pub struct CanonicalRequest {
    method: String,
    uri: String,
    query: String,
    headers: Vec<(String, String)>,
    signed_headers: String,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Build the canonical request from a request that already carries all
    /// headers to be signed.
    pub fn build(
        req: &SigningRequest,
        ctx: &SigningContext,
        payload_hash: impl Into<String>,
    ) -> Result<Self> {
        let names = signed_header_names(req);

        let mut headers = Vec::with_capacity(names.len());
        for name in names.iter() {
            let value = req.header_get_joined(*name)?.unwrap_or_default();
            headers.push((name.to_string(), normalize_header_value(&value)));
        }

        Ok(CanonicalRequest {
            method: req.method.as_str().to_ascii_uppercase(),
            uri: canonical_uri(req, ctx.double_url_encode)?,
            query: canonical_query(&req.query),
            headers,
            signed_headers: names.join(";"),
            payload_hash: payload_hash.into(),
        })
    }

    /// Signed header names joined by `;`.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// Canonical query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Hex encoded SHA-256 hash of the canonical request string.
    pub fn hash(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        for (name, value) in self.headers.iter() {
            writeln!(f, "{name}:{value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Percent encode the request path.
///
/// With `double_url_encode` the path is encoded as it appears on the wire,
/// so existing escapes like `%20` become `%2520`. Without it the path is
/// decoded first and encoded exactly once.
fn canonical_uri(req: &SigningRequest, double_url_encode: bool) -> Result<String> {
    let encoded = if double_url_encode {
        utf8_percent_encode(&req.path, &AWS_URI_ENCODE_SET).to_string()
    } else {
        utf8_percent_encode(&req.path_percent_decoded()?, &AWS_URI_ENCODE_SET).to_string()
    };

    if encoded.starts_with('/') {
        Ok(encoded)
    } else {
        Ok(format!("/{encoded}"))
    }
}

/// Encode every key and value, then order by key and by value for
/// duplicated keys.
fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    pairs.sort();

    let mut s = String::new();
    for (idx, (k, v)) in pairs.iter().enumerate() {
        if idx != 0 {
            s.push('&');
        }
        s.push_str(k);
        s.push('=');
        s.push_str(v);
    }
    s
}
