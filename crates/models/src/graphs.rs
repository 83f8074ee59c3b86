use super::{Tags, Violation};
use serde::{Deserialize, Serialize};

/// Graph plots metric streams, CAQL statements, and metric clusters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Graph {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub graph_style: GraphStyle,
    #[serde(default)]
    pub left: Option<GraphAxis>,
    #[serde(default)]
    pub metric: Vec<GraphMetric>,
    #[serde(default)]
    pub metric_cluster: Vec<GraphMetricCluster>,
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub right: Option<GraphAxis>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GraphStyle {
    Area,
    #[default]
    Line,
}

impl GraphStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphStyle::Area => "area",
            GraphStyle::Line => "line",
        }
    }
}

/// GraphAxis bounds the left or right Y axis.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GraphAxis {
    /// Logarithmic base, if the axis is logarithmic.
    pub logarithmic: Option<u32>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Left,
    Right,
}

impl Axis {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Axis::Left => "l",
            Axis::Right => "r",
        }
    }

    pub fn from_wire(s: &str) -> Self {
        if s == "r" {
            Axis::Right
        } else {
            Axis::Left
        }
    }
}

/// GraphMetric is a single plotted datapoint stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GraphMetric {
    #[serde(default = "super::default_true")]
    pub active: bool,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub axis: Axis,
    #[serde(default)]
    pub caql: Option<String>,
    /// CID of the check (`/check/1234`) which produces the metric.
    #[serde(default)]
    pub check: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub formula_legend: Option<String>,
    #[serde(default = "default_function")]
    pub function: String,
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default)]
    pub metric_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stack: Option<u32>,
}

fn default_function() -> String {
    "gauge".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GraphMetricCluster {
    #[serde(default = "super::default_true")]
    pub active: bool,
    #[serde(default = "default_aggregate")]
    pub aggregate: String,
    #[serde(default)]
    pub axis: Axis,
    #[serde(default)]
    pub color: Option<String>,
    /// CID of the metric cluster.
    pub group: String,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_aggregate() -> String {
    "none".to_string()
}

impl Graph {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        for (i, metric) in self.metric.iter().enumerate() {
            match (&metric.caql, &metric.check, &metric.metric_name) {
                (Some(_), None, None) => (),
                (None, Some(_), Some(_)) => (),
                _ => out.push(Violation::new(
                    format!("metric.{i}"),
                    "either caql, or both check and metric_name, must be set",
                )),
            }
            if let Some(alpha) = metric.alpha {
                if !(0.0..=1.0).contains(&alpha) {
                    out.push(Violation::new(
                        format!("metric.{i}.alpha"),
                        "alpha must be between 0 and 1",
                    ));
                }
            }
        }
        for (attr, axis) in [("left", &self.left), ("right", &self.right)] {
            if let Some(GraphAxis {
                min: Some(min),
                max: Some(max),
                ..
            }) = axis
            {
                if min > max {
                    out.push(Violation::new(
                        format!("{attr}.min"),
                        format!("min {min} exceeds max {max}"),
                    ));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graph_validation() {
        let graph: Graph = serde_json::from_value(json!({
            "name": "latency",
            "left": {"min": 10.0, "max": 1.0},
            "metric": [
                {"check": "/check/1", "metric_name": "rtt"},
                {"caql": "search:metric:average(\"rtt\")"},
                {"check": "/check/1"},
                {"caql": "x", "check": "/check/1", "metric_name": "rtt", "alpha": 2.0},
            ],
        }))
        .unwrap();

        assert_eq!(graph.graph_style, GraphStyle::Line);
        assert_eq!(graph.metric[0].function, "gauge");

        let paths: Vec<_> = graph.validate().into_iter().map(|v| v.path).collect();
        assert_eq!(paths, vec!["metric.2", "metric.3", "metric.3.alpha", "left.min"]);
    }
}
