//! # opnsense-core
//!
//! Core types and utilities for working with the OPNsense REST API.
//!
//! This crate provides the authenticated HTTP transport, configuration,
//! error handling and shared request types used by the endpoint crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status classification
//! - [`config`] - Connection and credential configuration
//! - [`client`] - HTTP client tunables and retry policy
//! - [`transport`] - The [`ApiTransport`] capability and its reqwest implementation
//! - [`query`] - Search request bodies shared by `search*` endpoints
//! - [`uuid`] - Opaque identifier wrappers for OPNsense resources

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod transport;
pub mod uuid;

// Re-export commonly used types
pub use config::OpnClientConfig;
pub use error::{Error, Result};
pub use query::SearchQuery;
pub use transport::{item_path, ApiTransport, OpnClient, OpnClientBuilder};
