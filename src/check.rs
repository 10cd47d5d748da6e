use crate::{
    client::JsonFetcher,
    collector::{self, Dispatch, MetricLists, SolrCollector},
    config::InstanceConfig,
    metrics::{MetricName, SolrMetric},
    sink::GaugeSink,
    SolrError,
};

/// Gauge name of every metric kind
pub const METRIC_NAME_MAP: [(MetricName, &str); 17] = [
    (MetricName::LiveNodes, "solr.live_nodes"),
    (MetricName::Shards, "solr.shard_count"),
    (MetricName::Replica, "solr.replica_count"),
    (MetricName::DocumentCount, "solr.document_count"),
    (MetricName::BrowseRps, "solr.browse.request_per_second"),
    (MetricName::SelectRps, "solr.select.request_per_second"),
    (MetricName::GetRps, "solr.get.request_per_second"),
    (MetricName::QueryRps, "solr.query.request_per_second"),
    (MetricName::UpdateRps, "solr.update.request_per_second"),
    (MetricName::BrowseRt, "solr.browse.request_time"),
    (MetricName::SelectRt, "solr.select.request_time"),
    (MetricName::GetRt, "solr.get.request_time"),
    (MetricName::QueryRt, "solr.query.request_time"),
    (MetricName::UpdateRt, "solr.update.request_time"),
    (MetricName::IndexSize, "solr.index_size"),
    (MetricName::TotalNumberOfShards, "solr.total_shards"),
    (MetricName::ShardsPerCollection, "solr.shards_per_collection"),
];

/// Name under which the check reports
pub const SOURCE_TYPE_NAME: &str = "solr";
/// Endpoint exposing the Solr version
pub const GET_VERSION_ENDPOINT: &str = "/solr/admin/info/system?wt=json";
/// Oldest major version accepted by the version probe
pub const MIN_MAJOR_VERSION: u32 = 4;

/// Gauge name of a metric kind
pub fn gauge_name(name: MetricName) -> crate::Result<&'static str> {
    METRIC_NAME_MAP
        .iter()
        .find(|(metric, _)| *metric == name)
        .map(|(_, gauge)| *gauge)
        .ok_or(SolrError::UnmappedMetric(name))
}

/// What a check cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The collector ran and this many gauges were submitted
    Submitted { gauges: usize },
    /// No collector exists for the Solr version, nothing was submitted
    Unsupported { version: String },
    /// Solr did not report its version yet, nothing was submitted
    VersionUnknown,
}

/// Solr check, one per monitored instance
///
/// The Solr version is probed until Solr reports it, then kept for the
/// lifetime of the check: an upgrade of Solr is not detected.
#[derive(Debug)]
pub struct SolrCheck<F> {
    /// Name of the check given by the agent
    name: String,
    /// Client used to query Solr
    fetcher: F,
    /// Version reported by Solr, once known
    version: Option<String>,
    /// Whether the unsupported version has already been reported
    warned_unsupported: bool,
}

impl<F: JsonFetcher> SolrCheck<F> {
    /// Create a new [`SolrCheck`] with an unknown version
    pub fn new(name: &str, fetcher: F) -> Self {
        Self {
            name: name.to_owned(),
            fetcher,
            version: None,
            warned_unsupported: false,
        }
    }

    /// Name of the check
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cached Solr version
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Collect the metrics of `instance` and submit them to `sink`
    pub async fn check(
        &mut self,
        instance: &InstanceConfig,
        sink: &mut dyn GaugeSink,
    ) -> crate::Result<CheckOutcome> {
        self.probe_version(instance).await?;

        let Some(version) = self.version.as_deref() else {
            log::debug!("[{}] Solr version is still unknown", self.name);
            return Ok(CheckOutcome::VersionUnknown);
        };

        // The cached version is kept even below the floor, every cycle fails then
        if collector::major_version(version)? < MIN_MAJOR_VERSION {
            return Err(SolrError::VersionTooOld {
                version: version.to_owned(),
                minimum: MIN_MAJOR_VERSION,
            });
        }

        let collector = match collector::select_collector(version, instance)? {
            Dispatch::Collector(collector) => collector,
            Dispatch::Unsupported { version } => {
                if !self.warned_unsupported {
                    log::warn!(
                        "[{}] Solr {version} is not supported, no metrics will be reported",
                        self.name
                    );
                    self.warned_unsupported = true;
                }
                return Ok(CheckOutcome::Unsupported { version });
            }
        };

        let lists = collector.check(&self.fetcher).await?;
        let gauges = submit(lists, sink)?;

        log::debug!("[{}] {gauges} gauges submitted", self.name);

        Ok(CheckOutcome::Submitted { gauges })
    }

    /// Fetch the Solr version unless it is already known
    ///
    /// The version is cached as soon as Solr reports it, before any validation.
    async fn probe_version(&mut self, instance: &InstanceConfig) -> crate::Result<()> {
        if self.version.is_some() {
            return Ok(());
        }

        let system = self
            .fetcher
            .get_url(&instance.host, &instance.ports, GET_VERSION_ENDPOINT)
            .await?;
        if system.is_empty() {
            return Ok(());
        }

        let version = system
            .get("lucene")
            .and_then(|lucene| lucene.get("solr-spec-version"))
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| SolrError::MissingField {
                endpoint: GET_VERSION_ENDPOINT.to_owned(),
                field: "lucene.solr-spec-version",
            })?;

        log::info!("[{}] Detected Solr {version}", self.name);
        self.version = Some(version.to_owned());

        Ok(())
    }
}

/// Submit every present metric as a gauge, returning the number of gauges
///
/// Names are resolved before anything is submitted, so an unmapped metric
/// leaves the sink untouched.
pub fn submit(lists: MetricLists, sink: &mut dyn GaugeSink) -> crate::Result<usize> {
    let metrics = lists
        .into_iter()
        .flatten()
        .flatten()
        .map(|metric| Ok((gauge_name(metric.name)?, metric)))
        .collect::<crate::Result<Vec<(&str, SolrMetric)>>>()?;

    for (name, metric) in &metrics {
        sink.gauge(name, metric.value, &metric.tags);
    }

    Ok(metrics.len())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;
    use crate::{
        client::testing::FakeFetcher,
        collector::solr5::{fixtures, CORES_STATUS_ENDPOINT},
        sink::testing::{Gauge, RecordingSink},
    };

    fn probe(version: &str) -> serde_json::Value {
        json!({
            "responseHeader": {"status": 0, "QTime": 12},
            "mode": "solrcloud",
            "lucene": {
                "solr-spec-version": version,
                "solr-impl-version": format!("{version} 1703449 - noble - 2015-09-17 01:48:15"),
                "lucene-spec-version": version,
            }
        })
    }

    fn instance() -> InstanceConfig {
        InstanceConfig::new("localhost", vec![8983])
    }

    #[test]
    fn every_metric_is_mapped() {
        let gauges = MetricName::ALL
            .iter()
            .map(|name| gauge_name(*name).unwrap())
            .collect::<HashSet<_>>();
        assert_eq!(gauges.len(), MetricName::ALL.len());
    }

    #[test]
    fn submit_live_nodes() {
        let mut sink = RecordingSink::default();
        let lists = vec![
            None,
            Some(vec![SolrMetric::new(MetricName::LiveNodes, 3.0, vec![])]),
        ];

        assert_eq!(submit(lists, &mut sink).unwrap(), 1);
        assert_eq!(
            sink.gauges,
            vec![Gauge {
                name: "solr.live_nodes".to_owned(),
                value: 3.0,
                tags: vec![],
            }]
        );
    }

    #[tokio::test]
    async fn solr5() {
        let fetcher = fixtures::cloud().with(GET_VERSION_ENDPOINT, probe("5.3.1"));
        let mut check = SolrCheck::new(SOURCE_TYPE_NAME, fetcher);
        let mut sink = RecordingSink::default();

        let outcome = check.check(&instance(), &mut sink).await.unwrap();

        assert_eq!(check.version(), Some("5.3.1"));
        assert_eq!(
            outcome,
            CheckOutcome::Submitted {
                gauges: fixtures::CLOUD_GAUGES
            }
        );
        assert_eq!(sink.gauges.len(), fixtures::CLOUD_GAUGES);
        assert_eq!(sink.gauges[0].name, "solr.live_nodes");
        assert_eq!(sink.gauges[0].value, 2.0);
        // The collector ran exactly once
        assert_eq!(check.fetcher.calls(CORES_STATUS_ENDPOINT), 1);
    }

    #[tokio::test]
    async fn version_probed_once() {
        let fetcher = fixtures::cloud().with(GET_VERSION_ENDPOINT, probe("5.3.1"));
        let mut check = SolrCheck::new(SOURCE_TYPE_NAME, fetcher);
        let mut sink = RecordingSink::default();

        check.check(&instance(), &mut sink).await.unwrap();
        check.check(&instance(), &mut sink).await.unwrap();

        assert_eq!(check.fetcher.calls(GET_VERSION_ENDPOINT), 1);
        assert_eq!(check.fetcher.calls(CORES_STATUS_ENDPOINT), 2);
        assert_eq!(sink.gauges.len(), 2 * fixtures::CLOUD_GAUGES);
    }

    #[tokio::test]
    async fn unsupported_versions() {
        for version in ["4.10.0", "6.0.0", "7.2.1"] {
            let fetcher = fixtures::cloud().with(GET_VERSION_ENDPOINT, probe(version));
            let mut check = SolrCheck::new(SOURCE_TYPE_NAME, fetcher);
            let mut sink = RecordingSink::default();

            let outcome = check.check(&instance(), &mut sink).await.unwrap();

            assert_eq!(
                outcome,
                CheckOutcome::Unsupported {
                    version: version.to_owned()
                }
            );
            assert_eq!(check.version(), Some(version));
            assert!(sink.gauges.is_empty());
            assert_eq!(check.fetcher.calls(CORES_STATUS_ENDPOINT), 0);
        }
    }

    #[tokio::test]
    async fn version_too_old() {
        let fetcher = fixtures::cloud().with(GET_VERSION_ENDPOINT, probe("3.6.0"));
        let mut check = SolrCheck::new(SOURCE_TYPE_NAME, fetcher);
        let mut sink = RecordingSink::default();

        let err = check.check(&instance(), &mut sink).await.unwrap_err();
        assert!(matches!(err, SolrError::VersionTooOld { minimum: 4, .. }));
        assert_eq!(check.version(), Some("3.6.0"));

        // The version is not probed again, and the next cycle fails the same way
        let err = check.check(&instance(), &mut sink).await.unwrap_err();
        assert!(matches!(err, SolrError::VersionTooOld { minimum: 4, .. }));

        assert_eq!(check.fetcher.calls(GET_VERSION_ENDPOINT), 1);
        assert_eq!(check.fetcher.calls(CORES_STATUS_ENDPOINT), 0);
        assert!(sink.gauges.is_empty());
    }

    #[tokio::test]
    async fn malformed_version_is_cached() {
        let fetcher = FakeFetcher::new().with(GET_VERSION_ENDPOINT, probe("x.1"));
        let mut check = SolrCheck::new(SOURCE_TYPE_NAME, fetcher);
        let mut sink = RecordingSink::default();

        for _ in 0..2 {
            let err = check.check(&instance(), &mut sink).await.unwrap_err();
            assert!(matches!(err, SolrError::MalformedVersion(_)));
        }

        assert_eq!(check.fetcher.calls(GET_VERSION_ENDPOINT), 1);
    }

    #[tokio::test]
    async fn empty_probe() {
        let mut check = SolrCheck::new(SOURCE_TYPE_NAME, FakeFetcher::new());
        let mut sink = RecordingSink::default();

        let outcome = check.check(&instance(), &mut sink).await.unwrap();

        assert_eq!(outcome, CheckOutcome::VersionUnknown);
        assert_eq!(check.version(), None);
        assert!(sink.gauges.is_empty());

        // The next check probes again
        check.check(&instance(), &mut sink).await.unwrap();
        assert_eq!(check.fetcher.calls(GET_VERSION_ENDPOINT), 2);
    }

    #[tokio::test]
    async fn missing_version_field() {
        let fetcher = FakeFetcher::new().with(GET_VERSION_ENDPOINT, json!({"mode": "std"}));
        let mut check = SolrCheck::new(SOURCE_TYPE_NAME, fetcher);
        let mut sink = RecordingSink::default();

        let err = check.check(&instance(), &mut sink).await.unwrap_err();

        assert!(matches!(err, SolrError::MissingField { .. }));
    }
}
