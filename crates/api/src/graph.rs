use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Graph plots datapoints, CAQL statements, and metric clusters. Overlay
/// sets are stored within the graph they decorate.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Graph {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    pub datapoints: Vec<GraphDatapoint>,
    pub description: Option<String>,
    pub logarithmic_left_y: Option<u32>,
    pub logarithmic_right_y: Option<u32>,
    pub max_left_y: Option<f64>,
    pub max_right_y: Option<f64>,
    pub metric_clusters: Vec<GraphMetricCluster>,
    pub min_left_y: Option<f64>,
    pub min_right_y: Option<f64>,
    pub notes: Option<String>,
    pub overlay_sets: BTreeMap<String, OverlaySet>,
    pub style: String,
    pub tags: Vec<String>,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GraphDatapoint {
    pub alpha: Option<String>,
    pub axis: String,
    pub caql: Option<String>,
    /// Numeric id of the check.
    pub check_id: Option<u64>,
    pub color: Option<String>,
    pub data_formula: Option<String>,
    pub derive: String,
    pub hidden: bool,
    pub legend_formula: Option<String>,
    pub metric_name: Option<String>,
    pub metric_type: Option<String>,
    pub name: Option<String>,
    pub stack: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GraphMetricCluster {
    pub aggregate: String,
    pub axis: String,
    pub color: Option<String>,
    pub hidden: bool,
    pub metric_cluster: String,
    pub name: Option<String>,
}

/// OverlaySet is a titled group of overlays, keyed by overlay id.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OverlaySet {
    pub overlays: BTreeMap<String, Overlay>,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Overlay {
    pub id: String,
    pub title: Option<String>,
    pub ui_specs: OverlayUiSpecs,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OverlayUiSpecs {
    pub decouple: bool,
    pub id: String,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    /// Time shift of the overlay, such as `86400s`.
    pub x_shift: Option<String>,
    pub z: Option<String>,
}

impl crate::Entity for Graph {
    const KIND: &'static str = "graph";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
