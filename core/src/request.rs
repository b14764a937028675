use std::borrow::Cow;
use std::mem;
use std::str::FromStr;

use http::header::AsHeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::Error;
use crate::Result;

/// Signing context for request.
///
/// Built from [`http::request::Parts`] before signing and applied back
/// afterwards. Signers only ever insert headers into it, so applying a
/// signing request never drops a header the caller set.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme, `http` if the request URI carries none.
    pub scheme: Scheme,
    /// HTTP authority, absent for origin-form request targets.
    pub authority: Option<Authority>,
    /// HTTP path exactly as it appears in the request URI.
    pub path: String,
    /// HTTP query parameters, percent decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,

    encoded_query: Option<String>,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    ///
    /// The request is left untouched until [`SigningRequest::apply`].
    pub fn build(parts: &http::request::Parts) -> Result<Self> {
        let uri = &parts.uri;
        let path = match uri.path() {
            "" => "/".to_string(),
            v => v.to_string(),
        };

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            authority: uri.authority().cloned(),
            path,
            query: uri
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),
            headers: parts.headers.clone(),

            encoded_query: None,
        })
    }

    /// Apply the signing context back to http::request::Parts.
    ///
    /// Headers are handed back as a whole. The URI is only rebuilt if a new
    /// query string has been set via [`SigningRequest::set_encoded_query`].
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        if let Some(query) = self.encoded_query.take() {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            let paq = if query.is_empty() {
                self.path.clone()
            } else {
                format!("{}?{}", self.path, query)
            };
            uri_parts.path_and_query = Some(PathAndQuery::from_str(&paq)?);
            parts.uri = Uri::from_parts(uri_parts)?;
        }

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        Ok(())
    }

    /// Get the path percent decoded.
    pub fn path_percent_decoded(&self) -> Result<Cow<str>> {
        percent_encoding::percent_decode_str(&self.path)
            .decode_utf8()
            .map_err(|e| {
                Error::request_invalid(format!("path {:?} is not valid utf-8", self.path))
                    .with_source(e)
            })
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Replace the request query string with an already encoded one on apply.
    pub fn set_encoded_query(&mut self, query: impl Into<String>) {
        self.encoded_query = Some(query.into());
    }

    /// Get header value by name.
    ///
    /// Multiple values of the same header are joined with `,` in the order
    /// they were inserted. Returns `None` if the header is absent. Values only
    /// need to be valid utf-8, not visible ascii.
    pub fn header_get_joined<K: AsHeaderName>(&self, key: K) -> Result<Option<String>> {
        let mut values = self.headers.get_all(key).iter().peekable();
        if values.peek().is_none() {
            return Ok(None);
        }

        let mut s = String::new();
        for (idx, v) in values.enumerate() {
            if idx != 0 {
                s.push(',');
            }
            s.push_str(std::str::from_utf8(v.as_bytes())?);
        }
        Ok(Some(s))
    }
}
