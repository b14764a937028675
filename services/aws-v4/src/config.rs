use std::collections::HashMap;
use std::env;

use crate::constants::{AWS_DEFAULT_REGION, AWS_REGION};

/// Config for the aws v4 request signer.
#[derive(Clone, Debug)]
pub struct Config {
    /// Service name the requests are signed for, e.g. `s3` or `dynamodb`.
    pub service: String,
    /// `region` will be loaded from:
    ///
    /// - this field if it's not empty
    /// - env value: `AWS_REGION`
    /// - env value: `AWS_DEFAULT_REGION`
    pub region: String,
    /// Encode already percent-encoded paths a second time.
    ///
    /// Enabled by default. S3 expects paths to be encoded exactly once, so
    /// disable it when signing S3 requests.
    pub double_url_encode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: String::new(),
            region: String::new(),
            double_url_encode: true,
        }
    }
}

impl Config {
    /// Create a config for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.to_string(),
            region: region.to_string(),
            ..Default::default()
        }
    }

    /// Load config from env.
    pub fn from_env(mut self) -> Self {
        let envs = env::vars().collect::<HashMap<_, _>>();

        if self.region.is_empty() {
            if let Some(v) = envs
                .get(AWS_REGION)
                .or_else(|| envs.get(AWS_DEFAULT_REGION))
            {
                self.region = v.to_string();
            }
        }

        self
    }
}
