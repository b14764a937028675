// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

/// Algorithm identifier placed in the string to sign and the authorization header.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
/// Fixed terminator of every credential scope.
pub const SCOPE_TERMINATOR: &str = "aws4_request";
/// Prefix prepended to the secret access key to seed the signing key chain.
pub const SECRET_KEY_PREFIX: &str = "AWS4";

// Headers used in aws services.
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// Header prefix whose members are always signed.
pub const X_AMZ_PREFIX: &str = "x-amz";

// Query parameters used by presigned requests.
pub const X_AMZ_ALGORITHM_QUERY: &str = "X-Amz-Algorithm";
pub const X_AMZ_CREDENTIAL_QUERY: &str = "X-Amz-Credential";
pub const X_AMZ_DATE_QUERY: &str = "X-Amz-Date";
pub const X_AMZ_EXPIRES_QUERY: &str = "X-Amz-Expires";
pub const X_AMZ_SIGNED_HEADERS_QUERY: &str = "X-Amz-SignedHeaders";
pub const X_AMZ_SECURITY_TOKEN_QUERY: &str = "X-Amz-Security-Token";
pub const X_AMZ_SIGNATURE_QUERY: &str = "X-Amz-Signature";

/// Presigned requests are valid for at most 7 days.
pub const PRESIGN_MAX_EXPIRES_SECS: u64 = 7 * 24 * 60 * 60;

/// Hex encoded SHA-256 of an empty payload.
pub const EMPTY_STRING_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
/// Payload hash used when the body is not part of the signature.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
/// `x-amz-content-sha256` value asking the signer to fill in the payload hash.
pub const CONTENT_SHA_256_REQUIRED: &str = "required";

// Env values used in aws services.
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
pub static AWS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// But used in query.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
