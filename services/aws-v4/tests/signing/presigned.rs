use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use http::header::AUTHORIZATION;
use http::request::Parts;
use pretty_assertions::assert_eq;
use sigv4kit_aws_v4::Credential;
use sigv4kit_core::ErrorKind;

use crate::{build_parts, init_test};

fn query_map(parts: &Parts) -> HashMap<String, String> {
    form_urlencoded::parse(parts.uri.query().unwrap_or_default().as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[test]
fn test_sign_query() -> Result<()> {
    let (signer, cred) = init_test();

    let mut parts = build_parts("GET", "https://bucket.s3.amazonaws.com/hello.txt", &[]);
    signer.sign_query(&mut parts, &cred, Duration::from_secs(3600))?;

    let query = query_map(&parts);
    assert_eq!(query["X-Amz-Algorithm"], "AWS4-HMAC-SHA256");
    assert_eq!(
        query["X-Amz-Credential"],
        "access/19810216/us-east-1/demo/aws4_request"
    );
    assert_eq!(query["X-Amz-Date"], "19810216T063000Z");
    assert_eq!(query["X-Amz-Expires"], "3600");
    assert_eq!(query["X-Amz-SignedHeaders"], "host");
    assert_eq!(query["X-Amz-Signature"].len(), 64);
    assert!(!query.contains_key("X-Amz-Security-Token"));

    assert_eq!(parts.uri.path(), "/hello.txt");
    assert!(parts.headers.get(AUTHORIZATION).is_none());
    assert!(parts.headers.get("x-amz-date").is_none());
    // Signature comes last so it can be stripped to recover the signed query.
    assert!(parts
        .uri
        .query()
        .unwrap_or_default()
        .rsplit('&')
        .next()
        .unwrap_or_default()
        .starts_with("X-Amz-Signature="));
    Ok(())
}

#[test]
fn test_sign_query_keeps_existing_params() -> Result<()> {
    let (signer, cred) = init_test();

    let mut parts = build_parts(
        "GET",
        "https://bucket.s3.amazonaws.com/?list-type=2&prefix=a%20b&delimiter=/",
        &[],
    );
    signer.sign_query(&mut parts, &cred, Duration::from_secs(60))?;

    let query = query_map(&parts);
    assert_eq!(query["list-type"], "2");
    assert_eq!(query["prefix"], "a b");
    assert_eq!(query["delimiter"], "/");
    assert!(query.contains_key("X-Amz-Signature"));
    Ok(())
}

#[test]
fn test_sign_query_twice() -> Result<()> {
    let (signer, _) = init_test();
    let cred = Credential::new("access", "secret").with_session_token("token");

    let mut once = build_parts("GET", "https://bucket.s3.amazonaws.com/k?acl", &[]);
    signer.sign_query(&mut once, &cred, Duration::from_secs(3600))?;
    let mut twice = build_parts("GET", "https://bucket.s3.amazonaws.com/k?acl", &[]);
    signer.sign_query(&mut twice, &cred, Duration::from_secs(60))?;
    signer.sign_query(&mut twice, &cred, Duration::from_secs(3600))?;

    let pairs = form_urlencoded::parse(twice.uri.query().unwrap_or_default().as_bytes())
        .map(|(k, _)| k.into_owned())
        .collect::<Vec<_>>();
    for key in [
        "X-Amz-Algorithm",
        "X-Amz-Credential",
        "X-Amz-Date",
        "X-Amz-Expires",
        "X-Amz-SignedHeaders",
        "X-Amz-Security-Token",
        "X-Amz-Signature",
        "acl",
    ] {
        assert_eq!(pairs.iter().filter(|k| *k == key).count(), 1, "{key}");
    }
    assert_eq!(query_map(&twice), query_map(&once));
    Ok(())
}

#[test]
fn test_sign_query_with_session_token() -> Result<()> {
    let (signer, _) = init_test();
    let cred = Credential::new("access", "secret").with_session_token("session/token+1");

    let mut parts = build_parts("GET", "https://bucket.s3.amazonaws.com/hello.txt", &[]);
    signer.sign_query(&mut parts, &cred, Duration::from_secs(3600))?;

    let query = query_map(&parts);
    assert_eq!(query["X-Amz-Security-Token"], "session/token+1");
    assert!(parts.headers.get("x-amz-security-token").is_none());
    Ok(())
}

#[test]
fn test_sign_query_signs_vendor_headers() -> Result<()> {
    let (signer, cred) = init_test();

    let mut parts = build_parts(
        "PUT",
        "https://bucket.s3.amazonaws.com/hello.txt",
        &[("x-amz-acl", "private"), ("content-type", "text/plain")],
    );
    signer.sign_query(&mut parts, &cred, Duration::from_secs(3600))?;

    assert_eq!(query_map(&parts)["X-Amz-SignedHeaders"], "host;x-amz-acl");
    Ok(())
}

#[test]
fn test_sign_query_expires() {
    let (signer, cred) = init_test();

    let mut parts = build_parts("GET", "https://bucket.s3.amazonaws.com/hello.txt", &[]);
    signer
        .sign_query(&mut parts, &cred, Duration::from_secs(7 * 24 * 3600))
        .expect("seven days must be accepted");

    let mut parts = build_parts("GET", "https://bucket.s3.amazonaws.com/hello.txt", &[]);
    let err = signer
        .sign_query(&mut parts, &cred, Duration::from_secs(7 * 24 * 3600 + 1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert_eq!(parts.uri.query(), None);
}

#[test]
fn test_sign_query_anonymous() -> Result<()> {
    let (signer, _) = init_test();

    let mut parts = build_parts("GET", "https://bucket.s3.amazonaws.com/hello.txt", &[]);
    signer.sign_query(&mut parts, &Credential::Anonymous, Duration::from_secs(3600))?;

    assert_eq!(
        parts.uri.to_string(),
        "https://bucket.s3.amazonaws.com/hello.txt"
    );
    assert!(parts.headers.is_empty());
    Ok(())
}
