use super::Tags;
use serde::{Deserialize, Serialize};

/// CollectorInfo is the read-only projection of a collector (broker).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CollectorInfo {
    pub details: Vec<CollectorDetail>,
    pub id: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub name: String,
    pub tags: Tags,
    #[serde(rename = "type")]
    pub type_: String,
}

/// CollectorDetail describes one instance within a collector cluster.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CollectorDetail {
    pub cn: String,
    pub external_host: Option<String>,
    pub external_port: Option<u64>,
    pub ip: Option<String>,
    pub min_version: Option<u64>,
    pub modules: Vec<String>,
    pub port: Option<u64>,
    pub skew: Option<String>,
    pub status: String,
    pub version: Option<u64>,
}
