use crate::{client::JsonFetcher, config::InstanceConfig, metrics::SolrMetric, SolrError};

pub mod solr5;

/// Metrics grouped by the endpoint they were read from
///
/// An endpoint that returned nothing is `None`
pub type MetricLists = Vec<Option<Vec<SolrMetric>>>;

/// Trait implemented once per supported Solr major version
#[async_trait::async_trait]
pub trait SolrCollector: std::fmt::Debug + Send + Sync {
    /// Full version string of the monitored Solr
    fn version(&self) -> &str;

    /// Query Solr and collect the metrics
    async fn check(&self, fetcher: &dyn JsonFetcher) -> crate::Result<MetricLists>;
}

/// Outcome of selecting a collector for a Solr version
#[derive(Debug)]
pub enum Dispatch {
    /// A collector exists for the version
    Collector(Box<dyn SolrCollector>),
    /// No collector handles this major version
    Unsupported { version: String },
}

/// Major version of Solr, read from the leading digit of the version string
pub fn major_version(version: &str) -> crate::Result<u32> {
    version
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| SolrError::MalformedVersion(version.to_owned()))
}

/// Pick the collector matching `version`
pub fn select_collector(version: &str, instance: &InstanceConfig) -> crate::Result<Dispatch> {
    let dispatch = match major_version(version)? {
        5 => Dispatch::Collector(Box::new(solr5::Solr5::new(version, instance.clone()))),
        _ => Dispatch::Unsupported {
            version: version.to_owned(),
        },
    };

    Ok(dispatch)
}
