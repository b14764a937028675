use std::fmt::{Debug, Formatter};
use std::io::Read;

use bytes::Bytes;
use sigv4kit_core::hash::{hex_sha256, hex_sha256_reader};
use sigv4kit_core::Result;

use crate::constants::{EMPTY_STRING_SHA256, UNSIGNED_PAYLOAD};

/// Payload is the content source of the request being signed.
///
/// A payload is consumed at most once per signing call. Callers that may
/// re-sign the same request must hand in a fresh or replayable source.
pub enum Payload<'a> {
    /// The request has no body.
    Empty,
    /// The whole body is available in memory.
    Bytes(Bytes),
    /// The body is read from a stream and hashed as it is read.
    Reader(&'a mut dyn Read),
    /// The body is not covered by the signature.
    Unsigned,
}

impl Payload<'_> {
    /// Hex encoded SHA-256 hash of the payload, as used in the canonical request.
    pub(crate) fn hash(self) -> Result<String> {
        match self {
            Payload::Empty => Ok(EMPTY_STRING_SHA256.to_string()),
            Payload::Bytes(bs) if bs.is_empty() => Ok(EMPTY_STRING_SHA256.to_string()),
            Payload::Bytes(bs) => Ok(hex_sha256(&bs)),
            Payload::Reader(r) => hex_sha256_reader(r),
            Payload::Unsigned => Ok(UNSIGNED_PAYLOAD.to_string()),
        }
    }
}

impl Debug for Payload<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Empty => f.write_str("Empty"),
            Payload::Bytes(bs) => write!(f, "Bytes({} bytes)", bs.len()),
            Payload::Reader(_) => f.write_str("Reader"),
            Payload::Unsigned => f.write_str("Unsigned"),
        }
    }
}

impl From<Bytes> for Payload<'_> {
    fn from(bs: Bytes) -> Self {
        Payload::Bytes(bs)
    }
}

impl From<&'static str> for Payload<'_> {
    fn from(s: &'static str) -> Self {
        Payload::Bytes(Bytes::from_static(s.as_bytes()))
    }
}
