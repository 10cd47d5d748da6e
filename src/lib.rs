//! Solr check for a host monitoring agent
//!
//! The check probes the Solr version once, picks the collector of that major
//! version, and submits every collected metric as a gauge through a
//! [`GaugeSink`] provided by the agent.

pub mod check;
pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod sink;

pub use check::{CheckOutcome, SolrCheck};
pub use client::{http::HttpFetcher, JsonFetcher};
pub use config::InstanceConfig;
pub use error::{Result, SolrError};
pub use sink::GaugeSink;
