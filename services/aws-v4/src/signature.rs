use std::fmt::Write;

use http::header::AUTHORIZATION;
use http::HeaderValue;
use sigv4kit_core::hash::hex_hmac_sha256;
use sigv4kit_core::{Result, SigningRequest};

use crate::constants::ALGORITHM;
use crate::key::SigningKey;

/// Build the string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(timestamp: &str, scope: &str, hashed_canonical_request: &str) -> Result<String> {
    let mut f = String::with_capacity(
        ALGORITHM.len() + timestamp.len() + scope.len() + hashed_canonical_request.len() + 3,
    );
    writeln!(f, "{ALGORITHM}")?;
    writeln!(f, "{timestamp}")?;
    writeln!(f, "{scope}")?;
    write!(f, "{hashed_canonical_request}")?;
    Ok(f)
}

/// Lower-case hex HMAC-SHA256 of the string to sign.
pub fn compute_signature(key: &SigningKey, string_to_sign: &str) -> Result<String> {
    hex_hmac_sha256(key.as_bytes(), string_to_sign.as_bytes())
}

/// Format the `Authorization` header value.
pub fn authorization_value(
    access_key_id: &str,
    scope: &str,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{ALGORITHM} Credential={access_key_id}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}

/// Set the `Authorization` header, replacing any previous value.
pub(crate) fn insert_authorization(req: &mut SigningRequest, value: &str) -> Result<()> {
    let mut authorization = HeaderValue::from_str(value)?;
    authorization.set_sensitive(true);

    req.headers.insert(AUTHORIZATION, authorization);
    Ok(())
}
