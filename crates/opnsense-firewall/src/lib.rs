//! Firewall API client for OPNsense.
//!
//! Provides an asynchronous client for the OPNsense firewall endpoints
//! (filter rules, aliases, categories and source NAT) plus typed views over
//! the common response shapes.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{FirewallClient, FirewallClientBuilder};
pub use models::{ApplyStatus, MutationResult, SearchResult};
pub use opnsense_core::uuid::{AliasUuid, NatRuleUuid, RuleUuid};
pub use opnsense_core::{Error, OpnClientConfig};

/// Convenient result alias that reuses the shared OPNsense error type.
pub type Result<T> = opnsense_core::Result<T>;
