//! Cross-check signatures against the AWS SDK signer.

use std::time::{Duration, SystemTime};

use anyhow::Result;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::PayloadChecksumKind;
use aws_sigv4::http_request::PercentEncodingMode;
use aws_sigv4::http_request::SignableBody;
use aws_sigv4::http_request::SignableRequest;
use aws_sigv4::http_request::SignatureLocation;
use aws_sigv4::http_request::SigningSettings;
use aws_sigv4::sign::v4;
use http::Request;
use pretty_assertions::assert_eq;
use sigv4kit_aws_v4::{Credential, Payload, RequestSigner};

use crate::fixed_time;

/// (name, request_builder)
type TestCase = (&'static str, fn() -> Request<&'static str>);

fn test_cases() -> Vec<TestCase> {
    vec![
        ("get_request", test_get_request),
        ("get_request_with_sse", test_get_request_with_sse),
        ("get_request_with_query", test_get_request_with_query),
        ("get_request_virtual_host", test_get_request_virtual_host),
        (
            "get_request_with_query_virtual_host",
            test_get_request_with_query_virtual_host,
        ),
        ("get_request_with_encoded_path", test_get_request_with_encoded_path),
    ]
}

fn get(uri: &str) -> Request<&'static str> {
    let mut req = Request::new("");
    *req.method_mut() = http::Method::GET;
    *req.uri_mut() = uri.parse().expect("url must be valid");
    req
}

fn test_get_request() -> Request<&'static str> {
    get("http://127.0.0.1:9000/hello")
}

fn test_get_request_with_sse() -> Request<&'static str> {
    let mut req = get("http://127.0.0.1:9000/hello");
    for (k, v) in [
        ("x-amz-server-side-encryption", "a"),
        ("x-amz-server-side-encryption-customer-algorithm", "b"),
        ("x-amz-server-side-encryption-customer-key", "c"),
        ("x-amz-server-side-encryption-customer-key-md5", "d"),
        ("x-amz-server-side-encryption-aws-kms-key-id", "e"),
    ] {
        req.headers_mut()
            .insert(k, v.parse().expect("must be valid"));
    }
    req
}

fn test_get_request_with_query() -> Request<&'static str> {
    get("http://127.0.0.1:9000/hello?list-type=2&max-keys=3&prefix=CI/&start-after=ExampleGuide.pdf")
}

fn test_get_request_virtual_host() -> Request<&'static str> {
    get("http://hello.s3.test.example.com")
}

fn test_get_request_with_query_virtual_host() -> Request<&'static str> {
    get("http://hello.s3.test.example.com?list-type=2&max-keys=3&prefix=CI/&start-after=ExampleGuide.pdf")
}

fn test_get_request_with_encoded_path() -> Request<&'static str> {
    get("http://127.0.0.1:9000/hello%20world/%E4%B8%AD%E6%96%87")
}

#[track_caller]
fn compare_request(name: &str, l: &Request<&str>, r: &Request<&str>) {
    fn format_headers(req: &Request<&str>) -> Vec<String> {
        let mut hs = req
            .headers()
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v.to_str().expect("must be valid")))
            .collect::<Vec<_>>();

        // Insert host if original request doesn't have it.
        let host = format!("host:{}", req.uri().authority().expect("must have authority"));
        if !hs.contains(&host) {
            hs.push(host)
        }

        hs.sort();
        hs
    }

    assert_eq!(
        format_headers(l),
        format_headers(r),
        "{name} header mismatch"
    );

    fn format_query(req: &Request<&str>) -> Vec<String> {
        let query = req.uri().query().unwrap_or_default();
        let mut query = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| format!("{}={}", &k, &v))
            .collect::<Vec<_>>();
        query.sort();
        query
    }

    assert_eq!(format_query(l), format_query(r), "{name} query mismatch");
}

fn aws_sign(
    req_fn: fn() -> Request<&'static str>,
    token: Option<&str>,
    location: SignatureLocation,
) -> Result<Request<&'static str>> {
    let mut req = req_fn();

    let mut ss = SigningSettings::default();
    ss.percent_encoding_mode = PercentEncodingMode::Double;
    ss.signature_location = location;
    if location == SignatureLocation::QueryParams {
        ss.expires_in = Some(Duration::from_secs(3600));
    } else {
        ss.payload_checksum_kind = PayloadChecksumKind::XAmzSha256;
    }

    let id = Credentials::new(
        "access_key_id",
        "secret_access_key",
        token.map(|v| v.to_string()),
        None,
        "hardcoded-credentials",
    )
    .into();
    let sp = v4::SigningParams::builder()
        .identity(&id)
        .region("test")
        .name("s3")
        .time(SystemTime::from(fixed_time()))
        .settings(ss)
        .build()
        .expect("signing params must be valid");

    let output = aws_sigv4::http_request::sign(
        SignableRequest::new(
            req.method().as_str(),
            req.uri().to_string(),
            req.headers()
                .iter()
                .map(|(k, v)| (k.as_str(), std::str::from_utf8(v.as_bytes()).unwrap())),
            SignableBody::UnsignedPayload,
        )
        .unwrap(),
        &sp.into(),
    )?;
    let (aws_sig, _) = output.into_parts();
    aws_sig.apply_to_request_http1x(&mut req);
    Ok(req)
}

fn sigv4kit_sign(
    req_fn: fn() -> Request<&'static str>,
    token: Option<&str>,
    location: SignatureLocation,
) -> Result<Request<&'static str>> {
    let mut cred = Credential::new("access_key_id", "secret_access_key");
    if let Some(token) = token {
        cred = cred.with_session_token(token);
    }

    let signer = RequestSigner::new("s3", "test").with_time(fixed_time());
    let (mut parts, body) = req_fn().into_parts();
    if location == SignatureLocation::QueryParams {
        signer.sign_query(&mut parts, &cred, Duration::from_secs(3600))?;
    } else {
        signer.sign(&mut parts, Payload::Unsigned, &cred)?;
    }
    Ok(Request::from_parts(parts, body))
}

#[test]
fn test_compare_with_aws_sigv4() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    for (name, req_fn) in test_cases() {
        for token in [None, Some("security_token")] {
            for location in [SignatureLocation::Headers, SignatureLocation::QueryParams] {
                let case = format!("{name} {location:?} token={}", token.is_some());

                let expected = aws_sign(req_fn, token, location)?;
                let actual = sigv4kit_sign(req_fn, token, location)?;
                compare_request(&case, &expected, &actual);
            }
        }
    }
    Ok(())
}
