/// Kind of metric a collector can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricName {
    LiveNodes,
    Shards,
    Replica,
    DocumentCount,
    BrowseRps,
    SelectRps,
    GetRps,
    QueryRps,
    UpdateRps,
    BrowseRt,
    SelectRt,
    GetRt,
    QueryRt,
    UpdateRt,
    IndexSize,
    TotalNumberOfShards,
    ShardsPerCollection,
}

impl MetricName {
    /// Every metric kind, in declaration order
    pub const ALL: [MetricName; 17] = [
        MetricName::LiveNodes,
        MetricName::Shards,
        MetricName::Replica,
        MetricName::DocumentCount,
        MetricName::BrowseRps,
        MetricName::SelectRps,
        MetricName::GetRps,
        MetricName::QueryRps,
        MetricName::UpdateRps,
        MetricName::BrowseRt,
        MetricName::SelectRt,
        MetricName::GetRt,
        MetricName::QueryRt,
        MetricName::UpdateRt,
        MetricName::IndexSize,
        MetricName::TotalNumberOfShards,
        MetricName::ShardsPerCollection,
    ];
}

/// A single observed quantity, ready to be submitted as a gauge
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct SolrMetric {
    /// Kind of the metric
    pub name: MetricName,
    /// Value of the metric
    pub value: f64,
    /// Tags attached to the metric, formatted as `key:value`
    pub tags: Vec<String>,
}

impl SolrMetric {
    /// Build a new [`SolrMetric`]
    pub fn new(name: MetricName, value: f64, tags: Vec<String>) -> Self {
        Self { name, value, tags }
    }
}

/// Tag keys used by the collectors
pub mod tag {
    pub const COLLECTION: &str = "solr.tag.collection";
    pub const SHARD: &str = "solr.tag.shard";
    pub const CORE: &str = "solr.tag.core";

    /// Format a `key:value` tag
    pub fn format(key: &str, value: &str) -> String {
        format!("{key}:{value}")
    }
}
