//! Core components for signing API requests.
//!
//! This crate provides the building blocks shared by the sigv4kit signers:
//!
//! - [`Error`] and [`ErrorKind`]: the error type every signing step returns.
//! - [`SigningRequest`]: an owned, editable view of [`http::request::Parts`]
//!   that signers canonicalize and then apply back to the request.
//!
//! ## Utilities
//!
//! The crate also provides utility modules:
//!
//! - [`hash`]: SHA-256 and HMAC-SHA256 helpers
//! - [`time`]: UTC timestamp formatting
//! - [`redact`]: masking secrets in `Debug` output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod redact;

mod error;
pub use error::{Error, ErrorKind, Result};

mod request;
pub use request::SigningRequest;
