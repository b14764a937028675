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

use sigv4kit_core::redact::Redact;
use std::fmt::{Debug, Formatter};

/// Credential used to sign a request.
///
/// Signing with [`Credential::Anonymous`] is not an error: the request is
/// left unsigned.
#[derive(Clone, Debug)]
pub enum Credential {
    /// An access key pair, optionally with a session token.
    Named(AccessKey),
    /// No credential at all.
    Anonymous,
}

/// AccessKey holds the access_key_id and secret_access_key.
#[derive(Default, Clone)]
pub struct AccessKey {
    /// Access key id for aws services.
    pub access_key_id: String,
    /// Secret access key for aws services.
    pub secret_access_key: String,
    /// Session token for aws services.
    pub session_token: Option<String>,
}

impl Debug for AccessKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessKey")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .finish()
    }
}

impl Credential {
    /// Create a named credential from an access key pair.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Credential::Named(AccessKey {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        })
    }

    /// Attach a session token to a named credential.
    ///
    /// Anonymous credentials are returned unchanged.
    pub fn with_session_token(self, token: impl Into<String>) -> Self {
        match self {
            Credential::Named(mut key) => {
                key.session_token = Some(token.into());
                Credential::Named(key)
            }
            Credential::Anonymous => Credential::Anonymous,
        }
    }

    /// Check if this credential is anonymous.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Credential::Anonymous)
    }
}

impl From<AccessKey> for Credential {
    fn from(key: AccessKey) -> Self {
        Credential::Named(key)
    }
}

impl AccessKey {
    /// Return a copy with surrounding whitespace removed from every field.
    ///
    /// Keys pasted from consoles or files often carry a trailing newline.
    pub(crate) fn sanitized(&self) -> AccessKey {
        AccessKey {
            access_key_id: self.access_key_id.trim().to_string(),
            secret_access_key: self.secret_access_key.trim().to_string(),
            session_token: self.session_token.as_deref().map(|v| v.trim().to_string()),
        }
    }
}
