use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MetricCluster {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    pub description: Option<String>,
    pub name: String,
    pub queries: Vec<ClusterQuery>,
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ClusterQuery {
    pub query: String,
    #[serde(rename = "type")]
    pub type_: String,
}

impl crate::Entity for MetricCluster {
    const KIND: &'static str = "metric_cluster";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
