//! Asynchronous firewall API client implementation.

use crate::Result;
use opnsense_core::client::{ClientConfig, RetryPolicy};
use opnsense_core::uuid::{AliasUuid, NatRuleUuid, RuleUuid};
use opnsense_core::{
    item_path, ApiTransport, OpnClient, OpnClientBuilder, OpnClientConfig, SearchQuery,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("opnsense-firewall/", env!("CARGO_PKG_VERSION"));

/// Builder for [`FirewallClient`].
#[derive(Debug)]
pub struct FirewallClientBuilder {
    inner: OpnClientBuilder,
}

impl FirewallClientBuilder {
    /// Create a builder from a connection configuration.
    #[must_use]
    pub fn new(config: OpnClientConfig) -> Self {
        Self {
            inner: OpnClientBuilder::new(config).with_user_agent(USER_AGENT),
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }

    /// Override the retry policy used for GET requests.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn build(self) -> Result<FirewallClient> {
        let inner = self.inner.build()?;
        Ok(FirewallClient::with_transport(Arc::new(inner)))
    }
}

/// Asynchronous client for the OPNsense firewall endpoints.
///
/// Each method issues exactly one request and returns the decoded response
/// unchanged. Failures from the transport are returned as is. Identifiers are
/// percent-encoded into a single path segment.
#[derive(Clone)]
pub struct FirewallClient {
    transport: Arc<dyn ApiTransport>,
}

impl FirewallClient {
    /// Construct a client from credentials, base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid base URL, an empty key or a zero timeout.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let config = OpnClientConfig::new(api_key, api_secret, base_url)?;
        FirewallClientBuilder::new(config).with_timeout(timeout).build()
    }

    /// Construct a client from a connection configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: OpnClientConfig) -> Result<Self> {
        FirewallClientBuilder::new(config).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: OpnClientConfig) -> FirewallClientBuilder {
        FirewallClientBuilder::new(config)
    }

    /// Wrap an existing transport, e.g. a shared [`OpnClient`] or a test double.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Return the current firewall automation rules.
    pub async fn get_automation_rules(&self) -> Result<Value> {
        self.transport.get("firewall/filter/searchRule").await
    }

    /// Return the current state of a single rule, including whether it is enabled.
    pub async fn get_rule_status(&self, uuid: &RuleUuid) -> Result<Value> {
        let path = item_path("firewall/filter/getRule", uuid.as_str())?;
        self.transport.get(&path).await
    }

    /// Flip a rule between enabled and disabled.
    pub async fn toggle_rule(&self, uuid: &RuleUuid) -> Result<Value> {
        let path = item_path("firewall/filter/toggleRule", uuid.as_str())?;
        self.transport.post(&path, &empty_body()).await
    }

    /// Apply pending filter rule changes.
    pub async fn apply_rules(&self) -> Result<Value> {
        self.transport
            .post("firewall/filter/apply/", &empty_body())
            .await
    }

    /// List firewall categories.
    pub async fn get_categories(&self) -> Result<Value> {
        let query = SearchQuery::all();
        self.transport
            .post("firewall/category/searchItem", &query.to_value()?)
            .await
    }

    /// List aliases filtered by alias type (`host`, `network`, `port`, ...)
    /// and category. Empty slices are sent as empty filters.
    pub async fn get_aliases(&self, types: &[&str], categories: &[&str]) -> Result<Value> {
        let query = SearchQuery::all()
            .with_types(types)
            .with_categories(categories);
        self.transport
            .post("firewall/alias/searchItem", &query.to_value()?)
            .await
    }

    /// Create an alias from an API-defined record.
    pub async fn add_alias<T>(&self, alias: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_value(alias)?;
        self.transport.post("firewall/alias/addItem", &body).await
    }

    /// Replace the settings of an existing alias.
    pub async fn set_alias<T>(&self, uuid: &AliasUuid, alias: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_value(alias)?;
        let path = item_path("firewall/alias/setItem", uuid.as_str())?;
        self.transport.post(&path, &body).await
    }

    /// Delete an alias.
    pub async fn del_alias(&self, uuid: &AliasUuid) -> Result<Value> {
        let path = item_path("firewall/alias/delItem", uuid.as_str())?;
        self.transport.post(&path, &empty_body()).await
    }

    /// Apply pending alias changes.
    pub async fn apply_aliases(&self) -> Result<Value> {
        self.transport
            .post("firewall/alias/set", &empty_body())
            .await
    }

    /// List source NAT rules in the given categories.
    pub async fn get_source_nat(&self, categories: &[&str]) -> Result<Value> {
        let query = SearchQuery::all().with_categories(categories);
        self.transport
            .post("firewall/source_nat/search_rule", &query.to_value()?)
            .await
    }

    /// Create a source NAT rule.
    pub async fn add_source_nat<T>(&self, rule: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_value(rule)?;
        self.transport
            .post("firewall/source_nat/add_rule", &body)
            .await
    }

    /// Delete a source NAT rule.
    pub async fn del_source_nat(&self, uuid: &NatRuleUuid) -> Result<Value> {
        let path = item_path("firewall/source_nat/del_rule", uuid.as_str())?;
        self.transport.post(&path, &empty_body()).await
    }

    /// List filter rules in the given categories.
    pub async fn get_filter_rules(&self, categories: &[&str]) -> Result<Value> {
        let query = SearchQuery::all().with_categories(categories);
        self.transport
            .post("firewall/filter/search_rule", &query.to_value()?)
            .await
    }

    /// Create a filter rule.
    pub async fn add_filter_rule<T>(&self, rule: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_value(rule)?;
        self.transport.post("firewall/filter/add_rule", &body).await
    }

    /// Delete a filter rule.
    pub async fn del_filter_rule(&self, uuid: &RuleUuid) -> Result<Value> {
        let path = item_path("firewall/filter/del_rule", uuid.as_str())?;
        self.transport.post(&path, &empty_body()).await
    }
}

impl From<OpnClient> for FirewallClient {
    fn from(client: OpnClient) -> Self {
        Self::with_transport(Arc::new(client))
    }
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}
