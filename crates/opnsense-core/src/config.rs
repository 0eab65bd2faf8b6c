//! Configuration for OPNsense API clients.
//!
//! [`OpnClientConfig`] carries everything needed to reach one appliance: the
//! API base URL, the key/secret pair, and the transport tunables.

use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Configuration for an OPNsense client instance.
///
/// The secret is redacted from `Debug` output and never serialized.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OpnClientConfig {
    /// API base URL (e.g. `https://fw.example.com/api`)
    #[validate(url)]
    pub base_url: String,

    /// API key, sent as the basic-auth username
    #[validate(length(min = 1))]
    pub api_key: String,

    /// API secret, sent as the basic-auth password
    #[serde(skip_serializing, deserialize_with = "deserialize_secret")]
    pub api_secret: SecretString,

    /// Whether to verify TLS certificates
    #[serde(default = "default_verify_cert")]
    pub verify_cert: bool,

    /// Optional path to an additional PEM CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of retry attempts for idempotent requests
    #[validate(range(max = 10))]
    #[serde(default)]
    pub max_retries: u32,
}

// Self-signed certificates are the norm on appliances.
const fn default_verify_cert() -> bool {
    false
}

const fn default_timeout_secs() -> u64 {
    crate::client::OPNSENSE_DEFAULT_TIMEOUT
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl OpnClientConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the API key is empty.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, Error> {
        let config = Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
            verify_cert: default_verify_cert(),
            ca_cert: None,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        };

        config
            .validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_verify_cert(mut self, verify: bool) -> Self {
        self.verify_cert = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse the base URL, normalised so relative paths append to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or cannot carry a path.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL: {e}")))?;

        if url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Base URL `{}` cannot carry a path",
                self.base_url
            )));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}
