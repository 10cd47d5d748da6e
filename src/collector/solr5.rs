use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use super::{MetricLists, SolrCollector};
use crate::{
    client::{self, JsonFetcher, JsonObject},
    config::InstanceConfig,
    metrics::{tag, MetricName, SolrMetric},
    SolrError,
};

/// Status of the cores hosted by the node
pub const CORES_STATUS_ENDPOINT: &str = "/solr/admin/cores?action=STATUS&wt=json";
/// State of the SolrCloud cluster the node belongs to
pub const CLUSTER_STATUS_ENDPOINT: &str = "/solr/admin/collections?action=CLUSTERSTATUS&wt=json";

/// Request handlers whose statistics are reported
const HANDLERS: [(&str, MetricName, MetricName); 5] = [
    ("/browse", MetricName::BrowseRps, MetricName::BrowseRt),
    ("/select", MetricName::SelectRps, MetricName::SelectRt),
    ("/get", MetricName::GetRps, MetricName::GetRt),
    ("/query", MetricName::QueryRps, MetricName::QueryRt),
    ("/update", MetricName::UpdateRps, MetricName::UpdateRt),
];

/// Query handler statistics of a single core
pub fn mbeans_endpoint(core: &str) -> crate::Result<String> {
    let path = client::encode_path(&["solr", core, "admin", "mbeans"])?;
    Ok(format!("{path}?stats=true&cat=QUERYHANDLER&wt=json&json.nl=map"))
}

/// [`SolrCollector`] for Solr 5.x
#[derive(Debug, Clone)]
pub struct Solr5 {
    version: String,
    instance: InstanceConfig,
}

impl Solr5 {
    /// Create a new [`Solr5`] collector
    pub fn new(version: &str, instance: InstanceConfig) -> Self {
        Self {
            version: version.to_owned(),
            instance,
        }
    }

    async fn fetch(&self, fetcher: &dyn JsonFetcher, path: &str) -> crate::Result<JsonObject> {
        fetcher
            .get_url(&self.instance.host, &self.instance.ports, path)
            .await
    }
}

#[async_trait::async_trait]
impl SolrCollector for Solr5 {
    fn version(&self) -> &str {
        &self.version
    }

    async fn check(&self, fetcher: &dyn JsonFetcher) -> crate::Result<MetricLists> {
        log::debug!(
            "Collect Solr {} metrics from {}",
            self.version,
            self.instance.host
        );

        let cores = self.fetch(fetcher, CORES_STATUS_ENDPOINT).await?;
        let cores = if cores.is_empty() {
            None
        } else {
            Some(parse::<CoresStatus>(CORES_STATUS_ENDPOINT, cores)?)
        };

        // Standalone nodes have no cluster state
        let cluster = self.fetch(fetcher, CLUSTER_STATUS_ENDPOINT).await?;
        let cluster = if cluster.contains_key("cluster") {
            Some(parse::<ClusterStatus>(CLUSTER_STATUS_ENDPOINT, cluster)?.cluster)
        } else {
            None
        };

        let local_cores: BTreeSet<&str> = cores
            .iter()
            .flat_map(|cores| cores.status.keys())
            .map(String::as_str)
            .collect();
        let locations = cluster
            .as_ref()
            .map(ClusterState::core_locations)
            .unwrap_or_default();

        let mut lists = vec![
            cluster.as_ref().map(live_nodes),
            cluster.as_ref().map(|cluster| shards(cluster, &local_cores)),
            cores.as_ref().map(|cores| core_index(cores, &locations)),
        ];

        for core in &local_cores {
            let endpoint = mbeans_endpoint(core)?;
            let mbeans = self.fetch(fetcher, &endpoint).await?;
            let handlers = if mbeans.is_empty() {
                None
            } else {
                Some(request_handlers(
                    &endpoint,
                    &mbeans,
                    &core_tags(core, &locations),
                )?)
            };
            lists.push(handlers);
        }

        log::trace!("Collected metrics: {lists:#?}");

        Ok(lists)
    }
}

fn parse<T: DeserializeOwned>(endpoint: &str, object: JsonObject) -> crate::Result<T> {
    serde_json::from_value(Value::Object(object)).map_err(|source| SolrError::Response {
        endpoint: endpoint.to_owned(),
        source,
    })
}

fn live_nodes(cluster: &ClusterState) -> Vec<SolrMetric> {
    vec![SolrMetric::new(
        MetricName::LiveNodes,
        cluster.live_nodes.len() as f64,
        Vec::new(),
    )]
}

fn shards(cluster: &ClusterState, local_cores: &BTreeSet<&str>) -> Vec<SolrMetric> {
    let mut metrics = Vec::new();
    let mut total = 0;

    for (collection, state) in &cluster.collections {
        let collection_tag = tag::format(tag::COLLECTION, collection);
        let local_shards = state
            .shards
            .values()
            .filter(|shard| {
                shard
                    .replicas
                    .values()
                    .any(|replica| local_cores.contains(replica.core.as_str()))
            })
            .count();
        total += state.shards.len();

        metrics.push(SolrMetric::new(
            MetricName::ShardsPerCollection,
            state.shards.len() as f64,
            vec![collection_tag.clone()],
        ));
        metrics.push(SolrMetric::new(
            MetricName::Shards,
            local_shards as f64,
            vec![collection_tag.clone()],
        ));

        for (shard, shard_state) in &state.shards {
            metrics.push(SolrMetric::new(
                MetricName::Replica,
                shard_state.replicas.len() as f64,
                vec![collection_tag.clone(), tag::format(tag::SHARD, shard)],
            ));
        }
    }

    metrics.push(SolrMetric::new(
        MetricName::TotalNumberOfShards,
        total as f64,
        Vec::new(),
    ));

    metrics
}

fn core_index(cores: &CoresStatus, locations: &HashMap<&str, (&str, &str)>) -> Vec<SolrMetric> {
    cores
        .status
        .iter()
        .filter_map(|(core, status)| {
            // Cores that failed to load report no index
            let index = status.index.as_ref()?;
            let tags = core_tags(core, locations);
            Some([
                SolrMetric::new(MetricName::DocumentCount, index.num_docs, tags.clone()),
                SolrMetric::new(MetricName::IndexSize, index.size_in_bytes, tags),
            ])
        })
        .flatten()
        .collect()
}

fn request_handlers(
    endpoint: &str,
    mbeans: &JsonObject,
    tags: &[String],
) -> crate::Result<Vec<SolrMetric>> {
    let handlers = match mbeans.get("solr-mbeans") {
        // json.nl=map
        Some(Value::Object(categories)) => categories.get("QUERYHANDLER").and_then(Value::as_object),
        // json.nl=flat: [category, handlers, category, handlers, ...]
        Some(Value::Array(categories)) => categories.chunks(2).find_map(|pair| match pair {
            [Value::String(category), Value::Object(handlers)] if category == "QUERYHANDLER" => {
                Some(handlers)
            }
            _ => None,
        }),
        _ => {
            return Err(SolrError::MissingField {
                endpoint: endpoint.to_owned(),
                field: "solr-mbeans",
            })
        }
    };

    let Some(handlers) = handlers else {
        return Ok(Vec::new());
    };

    let mut metrics = Vec::new();
    for (handler, rps, rt) in HANDLERS {
        let Some(stats) = handlers
            .get(handler)
            .and_then(|handler| handler.get("stats"))
        else {
            continue;
        };

        if let Some(value) = stats.get("avgRequestsPerSecond").and_then(Value::as_f64) {
            metrics.push(SolrMetric::new(rps, value, tags.to_vec()));
        }
        if let Some(value) = stats.get("avgTimePerRequest").and_then(Value::as_f64) {
            metrics.push(SolrMetric::new(rt, value, tags.to_vec()));
        }
    }

    Ok(metrics)
}

/// Tags of a core, with its collection and shard when the cluster knows them
fn core_tags(core: &str, locations: &HashMap<&str, (&str, &str)>) -> Vec<String> {
    let mut tags = Vec::with_capacity(3);
    if let Some((collection, shard)) = locations.get(core) {
        tags.push(tag::format(tag::COLLECTION, collection));
        tags.push(tag::format(tag::SHARD, shard));
    }
    tags.push(tag::format(tag::CORE, core));
    tags
}

#[derive(Debug, Default, Clone, Deserialize)]
struct CoresStatus {
    #[serde(default)]
    status: BTreeMap<String, CoreStatus>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct CoreStatus {
    #[serde(default)]
    index: Option<CoreIndex>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CoreIndex {
    num_docs: f64,
    size_in_bytes: f64,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ClusterStatus {
    cluster: ClusterState,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct ClusterState {
    collections: BTreeMap<String, CollectionState>,
    live_nodes: Vec<String>,
}

impl ClusterState {
    /// Map each core name to its (collection, shard)
    fn core_locations(&self) -> HashMap<&str, (&str, &str)> {
        self.collections
            .iter()
            .flat_map(|(collection, state)| {
                state.shards.iter().flat_map(move |(shard, shard_state)| {
                    shard_state.replicas.values().map(move |replica| {
                        (
                            replica.core.as_str(),
                            (collection.as_str(), shard.as_str()),
                        )
                    })
                })
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct CollectionState {
    shards: BTreeMap<String, ShardState>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct ShardState {
    replicas: BTreeMap<String, ReplicaState>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
struct ReplicaState {
    core: String,
}
