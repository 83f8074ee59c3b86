use crate::{error::fault, tags, Error, Meta, Translator};
use models::{
    ids::Entity, Axis, Graph, GraphAxis, GraphMetric, GraphMetricCluster, GraphStyle, Violation,
};
use schema::{descriptions, Attribute, Kind, Schema, Validator};

pub struct GraphTranslator;

const FUNCTIONS: &[&str] = &["gauge", "derive", "counter"];
const AGGREGATES: &[&str] = &["none", "min", "max", "sum", "average", "geometric_average"];
const METRIC_TYPES: &[&str] = &["numeric", "text", "histogram", "composite", "caql"];

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("description", "Description of the graph"),
    ("graph_style", "Whether datapoints are drawn as lines or areas"),
    ("left", "Bounds of the left Y axis"),
    ("left.logarithmic", "Logarithmic base of the axis"),
    ("left.max", "Upper bound of the axis"),
    ("left.min", "Lower bound of the axis"),
    ("metric", "Datapoints plotted, in drawing order"),
    ("metric.active", "Whether the datapoint is drawn"),
    ("metric.alpha", "Opacity of the datapoint, from 0 to 1"),
    ("metric.axis", "Y axis the datapoint is drawn against"),
    ("metric.caql", "CAQL statement producing the datapoint"),
    ("metric.check", "CID of the check producing the metric"),
    ("metric.color", "Color of the datapoint"),
    ("metric.formula", "Formula applied to the datapoint"),
    ("metric.formula_legend", "Formula applied to the legend"),
    ("metric.function", "Derivative applied to the metric"),
    ("metric.metric_name", "Name of the metric"),
    ("metric.metric_type", "Type of the metric"),
    ("metric.name", "Display name of the datapoint"),
    ("metric.stack", "Stacking group of the datapoint"),
    ("metric_cluster", "Metric clusters plotted, in drawing order"),
    ("metric_cluster.active", "Whether the cluster is drawn"),
    ("metric_cluster.aggregate", "Aggregation of the cluster's metrics"),
    ("metric_cluster.axis", "Y axis the cluster is drawn against"),
    ("metric_cluster.color", "Color of the cluster"),
    ("metric_cluster.group", "CID of the metric cluster"),
    ("metric_cluster.name", "Display name of the cluster"),
    ("name", "Title of the graph"),
    ("notes", "Notes about the graph"),
    ("right", "Bounds of the right Y axis"),
    ("right.logarithmic", "Logarithmic base of the axis"),
    ("right.max", "Upper bound of the axis"),
    ("right.min", "Lower bound of the axis"),
    ("tags", "Tags of the graph"),
];

fn axis_bounds() -> Schema {
    Schema::new()
        .attr(
            "logarithmic",
            Attribute::int().validate(Validator::IntRange { min: 2, max: 1000 }),
        )
        .attr("max", Attribute::float())
        .attr("min", Attribute::float())
}

fn axis() -> Attribute {
    Attribute::string()
        .default("left")
        .validate(Validator::OneOf(&["left", "right"]))
}

/// Numeric id of a `/check/<id>` CID, which datapoints reference.
fn check_id(cid: &str) -> Option<u64> {
    cid.strip_prefix("/check/")?.parse().ok()
}

impl Translator for GraphTranslator {
    const NAME: &'static str = "circonus_graph";
    // Overlay sets are managed through their own resource.
    const FETCH_BEFORE_UPDATE: bool = true;

    type Model = Graph;
    type Wire = api::Graph;

    fn schema() -> Schema {
        let metric = Schema::new()
            .attr("active", Attribute::bool().default(true))
            .attr(
                "alpha",
                Attribute::float().validate(Validator::FloatRange { min: 0.0, max: 1.0 }),
            )
            .attr("axis", axis())
            .attr("caql", Attribute::string())
            .attr("check", Attribute::string().validate(Validator::Cid(Entity::Check)))
            .attr("color", Attribute::string().validate(Validator::regex("^#[0-9a-fA-F]{6}$")))
            .attr("formula", Attribute::string())
            .attr("formula_legend", Attribute::string())
            .attr(
                "function",
                Attribute::string().default("gauge").validate(Validator::OneOf(FUNCTIONS)),
            )
            .attr("metric_name", Attribute::string())
            .attr("metric_type", Attribute::string().validate(Validator::OneOf(METRIC_TYPES)))
            .attr("name", Attribute::string())
            .attr("stack", Attribute::int().validate(Validator::IntRange { min: 0, max: 255 }));
        let metric_cluster = Schema::new()
            .attr("active", Attribute::bool().default(true))
            .attr(
                "aggregate",
                Attribute::string().default("none").validate(Validator::OneOf(AGGREGATES)),
            )
            .attr("axis", axis())
            .attr("color", Attribute::string().validate(Validator::regex("^#[0-9a-fA-F]{6}$")))
            .attr(
                "group",
                Attribute::string()
                    .required()
                    .validate(Validator::Cid(Entity::MetricCluster)),
            )
            .attr("name", Attribute::string());

        let mut schema = Schema::new()
            .attr("description", Attribute::string())
            .attr(
                "graph_style",
                Attribute::string()
                    .default("line")
                    .validate(Validator::OneOf(&["line", "area"])),
            )
            .attr("left", Attribute::block(axis_bounds()))
            .attr("metric", Attribute::list(Kind::Block(metric)))
            .attr("metric_cluster", Attribute::list(Kind::Block(metric_cluster)))
            .attr("name", Attribute::string().required())
            .attr("notes", Attribute::string())
            .attr("right", Attribute::block(axis_bounds()))
            .attr("tags", tags::attribute());

        descriptions::fuse(Self::NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn validate(graph: &Graph) -> Vec<Violation> {
        graph.validate()
    }

    fn encode(graph: &Graph, meta: &Meta) -> Result<api::Graph, Error> {
        let datapoints = graph
            .metric
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let check_id = match &m.check {
                    Some(cid) => Some(check_id(cid).ok_or_else(|| Error::Validation {
                        path: format!("metric.{i}.check"),
                        rule: format!("{cid:?} is not a check CID"),
                    })?),
                    None => None,
                };
                Ok(api::GraphDatapoint {
                    alpha: m.alpha.map(|a| a.to_string()),
                    axis: m.axis.as_wire().to_string(),
                    caql: m.caql.clone(),
                    check_id,
                    color: m.color.clone(),
                    data_formula: m.formula.clone(),
                    derive: m.function.clone(),
                    hidden: !m.active,
                    legend_formula: m.formula_legend.clone(),
                    metric_name: m.metric_name.clone(),
                    metric_type: m.metric_type.clone(),
                    name: m.name.clone(),
                    stack: m.stack,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let metric_clusters = graph
            .metric_cluster
            .iter()
            .map(|c| api::GraphMetricCluster {
                aggregate: c.aggregate.clone(),
                axis: c.axis.as_wire().to_string(),
                color: c.color.clone(),
                hidden: !c.active,
                metric_cluster: c.group.clone(),
                name: c.name.clone(),
            })
            .collect();

        let left = graph.left.clone().unwrap_or_default();
        let right = graph.right.clone().unwrap_or_default();

        Ok(api::Graph {
            cid: None,
            datapoints,
            description: graph.description.clone(),
            logarithmic_left_y: left.logarithmic,
            logarithmic_right_y: right.logarithmic,
            max_left_y: left.max,
            max_right_y: right.max,
            metric_clusters,
            min_left_y: left.min,
            min_right_y: right.min,
            notes: graph.notes.clone(),
            overlay_sets: Default::default(),
            style: graph.graph_style.as_str().to_string(),
            tags: tags::encode(&graph.tags, meta),
            title: graph.name.clone(),
        })
    }

    fn decode(wire: &api::Graph, meta: &Meta) -> Result<Graph, Error> {
        let metric = wire
            .datapoints
            .iter()
            .map(|d| GraphMetric {
                active: !d.hidden,
                alpha: d.alpha.as_deref().and_then(|a| match a.trim().parse() {
                    Ok(alpha) => Some(alpha),
                    Err(err) => {
                        fault(format_args!("graph datapoint has malformed alpha {a:?}: {err}"));
                        None
                    }
                }),
                axis: Axis::from_wire(&d.axis),
                caql: d.caql.clone(),
                check: d.check_id.map(|id| format!("/check/{id}")),
                color: d.color.clone(),
                formula: d.data_formula.clone(),
                formula_legend: d.legend_formula.clone(),
                function: if d.derive.is_empty() {
                    "gauge".to_string()
                } else {
                    d.derive.clone()
                },
                metric_name: d.metric_name.clone(),
                metric_type: d.metric_type.clone(),
                name: d.name.clone(),
                stack: d.stack,
            })
            .collect();

        let metric_cluster = wire
            .metric_clusters
            .iter()
            .map(|c| GraphMetricCluster {
                active: !c.hidden,
                aggregate: if c.aggregate.is_empty() {
                    "none".to_string()
                } else {
                    c.aggregate.clone()
                },
                axis: Axis::from_wire(&c.axis),
                color: c.color.clone(),
                group: c.metric_cluster.clone(),
                name: c.name.clone(),
            })
            .collect();

        let graph_style = match wire.style.as_str() {
            "area" => GraphStyle::Area,
            "line" | "" => GraphStyle::Line,
            other => {
                fault(format_args!("graph has unknown style {other:?}"));
                GraphStyle::Line
            }
        };

        Ok(Graph {
            description: wire.description.clone(),
            graph_style,
            left: axis_of(wire.logarithmic_left_y, wire.max_left_y, wire.min_left_y),
            metric,
            metric_cluster,
            name: wire.title.clone(),
            notes: wire.notes.clone(),
            right: axis_of(wire.logarithmic_right_y, wire.max_right_y, wire.min_right_y),
            tags: tags::decode(&wire.tags, meta),
        })
    }

    fn carry_over(next: &mut api::Graph, stored: api::Graph) {
        next.overlay_sets = stored.overlay_sets;
    }
}

fn axis_of(logarithmic: Option<u32>, max: Option<f64>, min: Option<f64>) -> Option<GraphAxis> {
    if logarithmic.is_none() && max.is_none() && min.is_none() {
        None
    } else {
        Some(GraphAxis { logarithmic, max, min })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_datapoints() {
        let graph: Graph = serde_json::from_value(json!({
            "name": "latency",
            "graph_style": "area",
            "left": {"min": 0.0},
            "metric": [
                {"check": "/check/1234", "metric_name": "rtt", "axis": "right", "alpha": 0.5},
                {"caql": "find(\"rtt\") | average()", "active": false, "function": "derive"},
            ],
            "metric_cluster": [{"group": "/metric_cluster/9"}],
        }))
        .unwrap();

        let wire = GraphTranslator::encode(&graph, &Meta::default()).unwrap();
        assert_eq!(wire.style, "area");
        assert_eq!(wire.min_left_y, Some(0.0));
        assert_eq!(wire.datapoints[0].check_id, Some(1234));
        assert_eq!(wire.datapoints[0].axis, "r");
        assert_eq!(wire.datapoints[0].alpha.as_deref(), Some("0.5"));
        assert!(wire.datapoints[1].hidden);
        assert_eq!(wire.metric_clusters[0].aggregate, "none");

        let decoded = GraphTranslator::decode(&wire, &Meta::default()).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn test_overlay_sets_carry_over() {
        let mut stored = api::Graph::default();
        stored
            .overlay_sets
            .insert("abc".to_string(), api::OverlaySet::default());

        let mut next = api::Graph::default();
        GraphTranslator::carry_over(&mut next, stored);
        assert!(next.overlay_sets.contains_key("abc"));
    }
}
