use serde::{Deserialize, Serialize};

/// Default port of a Solr node
pub const DEFAULT_PORT: u16 = 8983;

/// Configuration of one monitored Solr deployment
///
/// It is owned by the host agent and handed to every check read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Host running Solr
    pub host: String,
    /// Candidate ports, tried in order until one answers
    #[serde(default = "default_ports")]
    pub ports: Vec<u16>,
}

impl InstanceConfig {
    /// Build a new [`InstanceConfig`]
    pub fn new(host: impl Into<String>, ports: Vec<u16>) -> Self {
        Self {
            host: host.into(),
            ports,
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self::new("localhost", default_ports())
    }
}

fn default_ports() -> Vec<u16> {
    vec![DEFAULT_PORT]
}
