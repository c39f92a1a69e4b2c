//! Cluster topology as reported by `/dir/status`, and the datacenter cache
//! built from it.
//!
//! The cache maps a storage node's `url` to the id of the datacenter it lives
//! in. It is rebuilt from scratch on every refresh and swapped in whole, so a
//! reader always sees the nodes of exactly one status snapshot.

use crate::master::types::Location;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// `/dir/status` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    #[serde(rename = "Topology", alias = "topology")]
    pub topology: Topology,
    #[serde(rename = "Version", alias = "version")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    #[serde(rename = "DataCenters", alias = "dataCenters")]
    pub data_centers: Vec<DataCenter>,
    #[serde(rename = "Free", alias = "free")]
    pub free: i64,
    #[serde(rename = "Max", alias = "max")]
    pub max: i64,
    #[serde(rename = "layouts", alias = "Layouts")]
    pub layouts: Vec<Layout>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataCenter {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,
    #[serde(rename = "Free", alias = "free")]
    pub free: i64,
    #[serde(rename = "Max", alias = "max")]
    pub max: i64,
    #[serde(rename = "Racks", alias = "racks")]
    pub racks: Vec<Rack>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rack {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,
    #[serde(rename = "Free", alias = "free")]
    pub free: i64,
    #[serde(rename = "Max", alias = "max")]
    pub max: i64,
    #[serde(rename = "DataNodes", alias = "dataNodes")]
    pub data_nodes: Vec<DataNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataNode {
    #[serde(rename = "Url", alias = "url")]
    pub url: String,
    #[serde(rename = "PublicUrl", alias = "publicUrl")]
    pub public_url: String,
    #[serde(rename = "Free", alias = "free")]
    pub free: i64,
    #[serde(rename = "Max", alias = "max")]
    pub max: i64,
    #[serde(rename = "Volumes", alias = "volumes")]
    pub volumes: i64,
}

/// Writable volumes of one collection/replication/ttl combination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub collection: String,
    pub replication: String,
    pub ttl: String,
    pub writables: Vec<u64>,
}

impl SystemStatus {
    /// Flatten the datacenter → rack → node tree into `node url → datacenter id`.
    ///
    /// Datacenters without an id are skipped so that an empty datacenter
    /// preference can never match a node.
    pub fn datacenter_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for dc in &self.topology.data_centers {
            if dc.id.is_empty() {
                continue;
            }
            for rack in &dc.racks {
                for node in &rack.data_nodes {
                    map.insert(node.url.clone(), dc.id.clone());
                }
            }
        }
        map
    }

    pub fn node_count(&self) -> usize {
        self.topology
            .data_centers
            .iter()
            .flat_map(|dc| &dc.racks)
            .map(|rack| rack.data_nodes.len())
            .sum()
    }
}

/// Shared `node url → datacenter id` snapshot
#[derive(Debug, Default)]
pub struct TopologyCache {
    nodes: RwLock<Arc<HashMap<String, String>>>,
}

impl TopologyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole mapping. The map is built by the caller, outside
    /// the lock. Only the refresh path writes here.
    pub(crate) fn replace(&self, nodes: HashMap<String, String>) {
        let nodes = Arc::new(nodes);
        *self.nodes.write().unwrap_or_else(PoisonError::into_inner) = nodes;
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<HashMap<String, String>> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn datacenter_of(&self, url: &str) -> Option<String> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pick the replica to talk to.
    ///
    /// Returns the first location (in the master's order) whose node is known
    /// to sit in `datacenter`, falling back to the first location. A cold or
    /// stale cache therefore only costs locality. `None` only for an empty
    /// slice.
    pub fn nearest<'a>(&self, locations: &'a [Location], datacenter: &str) -> Option<&'a Location> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);

        locations
            .iter()
            .find(|loc| {
                nodes
                    .get(&loc.url)
                    .is_some_and(|dc| !datacenter.is_empty() && dc == datacenter)
            })
            .or_else(|| locations.first())
    }
}
