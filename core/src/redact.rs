//! Masking of secrets in `Debug` output.

use std::fmt::{Debug, Formatter};

/// Number of characters kept visible at each end of a long secret.
const VISIBLE: usize = 3;
/// Secrets shorter than this are masked entirely.
const MIN_PARTIAL_LEN: usize = 12;

/// Debug view of a secret.
///
/// Short values print as `***`, missing or empty values as `EMPTY`. Long
/// values keep their first and last three characters, enough to tell two
/// access keys apart in logs.
#[derive(Clone, Copy)]
pub struct Redact<'a>(Option<&'a str>);

impl<'a> Redact<'a> {
    /// Wrap a secret that may be absent.
    pub fn new(secret: Option<&'a str>) -> Self {
        Redact(secret)
    }
}

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(Some(value))
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(Some(value))
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let secret = match self.0 {
            None | Some("") => return f.write_str("EMPTY"),
            Some(v) => v,
        };

        let len = secret.chars().count();
        if len < MIN_PARTIAL_LEN {
            return f.write_str("***");
        }

        // Byte offsets of the visible head and tail, on char boundaries.
        let head_end = secret
            .char_indices()
            .nth(VISIBLE)
            .map_or(secret.len(), |(idx, _)| idx);
        let tail_start = secret
            .char_indices()
            .nth(len - VISIBLE)
            .map_or(secret.len(), |(idx, _)| idx);

        write!(f, "{}***{}", &secret[..head_end], &secret[tail_start..])
    }
}
