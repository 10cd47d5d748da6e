use thiserror::Error;

use crate::metrics::MetricName;

/// Result type for Solr check operations
pub type Result<T> = std::result::Result<T, SolrError>;

/// Errors that abort a check cycle
#[derive(Error, Debug)]
pub enum SolrError {
    #[error("Could not build Solr URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unexpected response from {endpoint}: {source}")]
    Response {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing field `{field}` in response from {endpoint}")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },

    #[error("Malformed Solr version: {0:?}")]
    MalformedVersion(String),

    #[error("Solr version {version} is older than the minimum major version {minimum}")]
    VersionTooOld { version: String, minimum: u32 },

    #[error("No gauge name registered for {0:?}")]
    UnmappedMetric(MetricName),
}
