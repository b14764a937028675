//! Header selection and normalization rules.

use http::uri::Authority;
use http::uri::Scheme;

use crate::constants::X_AMZ_PREFIX;

/// Check if the header should be part of the signed header set.
///
/// Matching is case-insensitive: `host`, `content-md5` and every header
/// starting with `x-amz` are signed, everything else is not.
pub fn needs_sign(name: &str) -> bool {
    name.eq_ignore_ascii_case("host")
        || name.eq_ignore_ascii_case("content-md5")
        || name
            .get(..X_AMZ_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(X_AMZ_PREFIX))
}

/// Normalize header value for the canonical request.
///
/// Leading and trailing whitespace is removed and every interior run of
/// whitespace collapses to a single space.
pub fn normalize_header_value(value: &str) -> String {
    let mut s = String::with_capacity(value.len());
    for (idx, word) in value.split_whitespace().enumerate() {
        if idx != 0 {
            s.push(' ');
        }
        s.push_str(word);
    }
    s
}

/// Build the `Host` header value for an authority.
///
/// Userinfo is never part of the header, and a port equal to the default
/// port of the scheme is omitted.
pub fn host_header_value(scheme: &Scheme, authority: &Authority) -> String {
    let default_port = if *scheme == Scheme::HTTPS {
        Some(443)
    } else if *scheme == Scheme::HTTP {
        Some(80)
    } else {
        None
    };

    match authority.port_u16() {
        Some(port) if Some(port) != default_port => format!("{}:{}", authority.host(), port),
        _ => authority.host().to_string(),
    }
}
