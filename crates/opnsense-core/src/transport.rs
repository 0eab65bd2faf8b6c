//! Authenticated HTTP transport for the OPNsense API.
//!
//! [`ApiTransport`] is the capability endpoint wrappers are written against:
//! an authenticated `get` and `post` returning the decoded JSON body.
//! [`OpnClient`] is the reqwest-backed implementation.

use crate::client::{ClientConfig, RetryPolicy};
use crate::config::OpnClientConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, Method};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;
use validator::Validate;

const USER_AGENT: &str = concat!("opnsense-core/", env!("CARGO_PKG_VERSION"));

/// Characters escaped when an identifier is placed in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Append `id` to `endpoint` as exactly one percent-encoded path segment.
///
/// `item_path("firewall/alias/delItem", "u1#x")` yields
/// `firewall/alias/delItem/u1%23x`.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] for an empty identifier or one that is
/// a dot segment (`.` or `..`), since those cannot name an item.
pub fn item_path(endpoint: &str, id: &str) -> Result<String> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(Error::InvalidEndpoint(format!(
            "Identifier `{id}` cannot be used as a path segment"
        )));
    }

    let endpoint = endpoint.trim_end_matches('/');
    Ok(format!("{endpoint}/{}", utf8_percent_encode(id, PATH_SEGMENT)))
}

/// Authenticated request primitives against one OPNsense appliance.
///
/// Paths are relative to the API base URL (`firewall/alias/set`, not
/// `/api/firewall/alias/set`).
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issue a GET and return the decoded response body.
    ///
    /// # Errors
    ///
    /// [`Error::Auth`] on rejected credentials, [`Error::Transport`] or
    /// [`Error::Timeout`] on network failure, [`Error::Api`] on any other
    /// non-success status.
    async fn get(&self, path: &str) -> Result<Value>;

    /// Issue a POST with a JSON body and return the decoded response body.
    ///
    /// Action endpoints take an empty object (`{}`).
    ///
    /// # Errors
    ///
    /// Same classification as [`ApiTransport::get`].
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
}

struct Credentials {
    api_key: String,
    api_secret: SecretString,
}

/// Builder for [`OpnClient`].
#[derive(Debug)]
pub struct OpnClientBuilder {
    config: OpnClientConfig,
    http_config: ClientConfig,
    user_agent: String,
}

impl OpnClientBuilder {
    /// Create a builder from an [`OpnClientConfig`].
    #[must_use]
    pub fn new(config: OpnClientConfig) -> Self {
        let retry_policy = if config.max_retries > 0 {
            RetryPolicy::new().with_max_retries(config.max_retries)
        } else {
            RetryPolicy::no_retry()
        };

        let http_config = ClientConfig::new()
            .with_timeout(config.timeout())
            .with_retry_policy(retry_policy);

        Self {
            config,
            http_config,
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Replace the HTTP client configuration, including timeout and retries.
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_config = self.http_config.with_timeout(timeout);
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.http_config = self.http_config.with_retry_policy(retry);
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Finalise the builder and create the [`OpnClient`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid base URL, a zero timeout, an
    /// unreadable CA certificate or when the HTTP client cannot be built.
    pub fn build(self) -> Result<OpnClient> {
        self.config.validate()?;
        let base_url = self.config.parse_base_url()?;
        let http_config = self.http_config;

        if http_config.timeout.is_zero() {
            return Err(Error::Config("Request timeout must be non-zero".to_string()));
        }

        let mut builder = ClientBuilder::new()
            .user_agent(self.user_agent)
            .timeout(http_config.timeout)
            .connect_timeout(http_config.effective_connect_timeout())
            .pool_idle_timeout(http_config.pool_idle_timeout)
            .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
            .gzip(http_config.enable_compression);

        if !self.config.verify_cert {
            warn!(base_url = %base_url, "TLS certificate verification disabled for OPNsense client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &self.config.ca_cert {
            debug!("loading OPNsense CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::Config(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let certs = reqwest::Certificate::from_pem_bundle(&bytes)
                .map_err(|err| Error::Config(format!("Invalid CA certificate: {err}")))?;
            if certs.is_empty() {
                return Err(Error::Config(format!(
                    "No PEM certificate found in {}",
                    ca_cert.display()
                )));
            }
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(OpnClient {
            http,
            base_url,
            credentials: Arc::new(Credentials {
                api_key: self.config.api_key,
                api_secret: self.config.api_secret,
            }),
            retry_policy: http_config.retry_policy,
        })
    }
}

/// Asynchronous, authenticated client for one OPNsense appliance.
///
/// Clones share the connection pool and credentials.
#[derive(Clone)]
pub struct OpnClient {
    http: Client,
    base_url: Url,
    credentials: Arc<Credentials>,
    retry_policy: RetryPolicy,
}

impl OpnClient {
    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`OpnClientBuilder::build`].
    pub fn from_config(config: OpnClientConfig) -> Result<Self> {
        OpnClientBuilder::new(config).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: OpnClientConfig) -> OpnClientBuilder {
        OpnClientBuilder::new(config)
    }

    /// Return the normalised base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the API key in use.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.credentials.api_key
    }

    /// Return the retry policy applied to GET requests.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with('/') {
            return Err(Error::InvalidEndpoint(format!(
                "Path `{path}` must be relative to the API base URL"
            )));
        }

        self.base_url
            .join(path)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid path `{path}`: {err}")))
    }

    async fn execute(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.build_url(path)?;

        // POSTs trigger state changes on the appliance and are sent once.
        let retry = if method == Method::GET {
            self.retry_policy
        } else {
            RetryPolicy::no_retry()
        };

        let mut attempt = 0;
        loop {
            debug!(method = %method, path = %path, attempt, "Sending OPNsense request");

            match self.send_once(method.clone(), url.clone(), path, body).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                    attempt += 1;
                    let delay = retry.delay_for_attempt(attempt);
                    debug!(
                        path = %path,
                        attempt,
                        error = %err,
                        "Retrying OPNsense request after {:?}",
                        delay
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .http
            .request(method, url)
            .basic_auth(
                &self.credentials.api_key,
                Some(self.credentials.api_secret.expose_secret()),
            )
            .header(ACCEPT, "application/json");

        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), path = %path, "OPNsense request failed");
            return Err(Error::from_status(status, text));
        }

        decode_body(&text)
    }
}

#[async_trait]
impl ApiTransport for OpnClient {
    async fn get(&self, path: &str) -> Result<Value> {
        self.execute(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.execute(Method::POST, path, Some(body)).await
    }
}

/// Decode a success body. An empty body decodes to [`Value::Null`].
fn decode_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(text).map_err(|err| Error::Decode(format!("Invalid JSON response: {err}")))
}
