use super::{Tags, Violation};
use serde::{Deserialize, Serialize};

/// MetricCluster is a named set of metric search queries, which graphs
/// may plot as an aggregate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricCluster {
    #[serde(default)]
    pub description: Option<String>,
    pub name: String,
    pub query: Vec<ClusterQuery>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClusterQuery {
    pub definition: String,
    #[serde(rename = "type")]
    pub type_: String,
}

impl ClusterQuery {
    pub const TYPES: &'static [&'static str] = &[
        "average",
        "count",
        "counter",
        "counter2",
        "counter2_stddev",
        "counter_stddev",
        "derive",
        "derive2",
        "derive2_stddev",
        "derive_stddev",
        "histogram",
        "stddev",
        "text",
    ];
}

impl MetricCluster {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        if self.query.is_empty() {
            out.push(Violation::new("query", "at least one query is required"));
        }
        for (i, query) in self.query.iter().enumerate() {
            if !ClusterQuery::TYPES.contains(&query.type_.as_str()) {
                out.push(Violation::new(
                    format!("query.{i}.type"),
                    format!("{:?} is not a metric cluster query type", query.type_),
                ));
            }
        }
        out
    }
}
