//! AWS SigV4 request signer
//!
//! Signs [`http::request::Parts`] in place, either with an `Authorization`
//! header ([`RequestSigner::sign`]) or with a presigned query string
//! ([`RequestSigner::sign_query`]).
//!
//! ```rust
//! use std::time::Duration;
//!
//! use sigv4kit_aws_v4::{Config, Credential, RequestSigner};
//!
//! # fn main() -> sigv4kit_core::Result<()> {
//! let signer = RequestSigner::from_config(&Config::new("s3", "us-east-1"))?
//!     .with_double_url_encode(false);
//! let cred = Credential::new("access_key_id", "secret_access_key");
//!
//! let req = http::Request::get("https://bucket.s3.amazonaws.com/hello.txt")
//!     .body(())
//!     .expect("request must be valid");
//! let (mut parts, _) = req.into_parts();
//!
//! signer.sign_query(&mut parts, &cred, Duration::from_secs(3600))?;
//! assert!(parts.uri.query().unwrap_or_default().contains("X-Amz-Signature="));
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::AccessKey;
pub use credential::Credential;

mod header;
pub use header::needs_sign;
pub use header::normalize_header_value;

mod payload;
pub use payload::Payload;

mod canonical;
pub use canonical::CanonicalRequest;
pub use canonical::SigningContext;

mod key;
pub use key::SigningKey;

mod signature;
pub use signature::authorization_value;
pub use signature::compute_signature;
pub use signature::string_to_sign;

mod sign_request;
pub use sign_request::RequestSigner;
