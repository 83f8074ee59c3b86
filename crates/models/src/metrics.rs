use super::{MetricType, Tags};
use serde::{Deserialize, Serialize};

/// Metric is a client-side description of a metric stream, which is never
/// persisted by the platform. Checks reference metrics by value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Metric {
    #[serde(default = "super::default_true")]
    pub active: bool,
    pub name: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(rename = "type")]
    pub type_: MetricType,
    #[serde(default)]
    pub unit: Option<String>,
}
