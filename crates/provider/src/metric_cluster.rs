use crate::{
    hashing::{sum, Field},
    tags, Error, Meta, Translator,
};
use models::{ClusterQuery, MetricCluster, Violation};
use schema::{descriptions, Attribute, Kind, Schema, Validator};
use serde_json::Value;

pub struct MetricClusterTranslator;

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("description", "Description of the cluster"),
    ("name", "Name of the cluster"),
    ("query", "Metric searches whose results form the cluster"),
    ("query.definition", "Metric search"),
    ("query.type", "Aggregation of the matched metrics"),
    ("tags", "Tags of the cluster"),
];

const QUERY_FIELDS: &[Field] = &[Field::Str("definition"), Field::Str("type")];

fn query_hash(v: &Value) -> u32 {
    sum(v, QUERY_FIELDS)
}

impl Translator for MetricClusterTranslator {
    const NAME: &'static str = "circonus_metric_cluster";

    type Model = MetricCluster;
    type Wire = api::MetricCluster;

    fn schema() -> Schema {
        let query = Schema::new()
            .attr("definition", Attribute::string().required())
            .attr(
                "type",
                Attribute::string()
                    .required()
                    .validate(Validator::OneOf(ClusterQuery::TYPES)),
            );

        let mut schema = Schema::new()
            .attr("description", Attribute::string())
            .attr("name", Attribute::string().required())
            .attr(
                "query",
                Attribute::set(Kind::Block(query))
                    .required()
                    .min_items(1)
                    .hash_with(query_hash),
            )
            .attr("tags", tags::attribute());

        descriptions::fuse(Self::NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn validate(cluster: &MetricCluster) -> Vec<Violation> {
        cluster.validate()
    }

    fn encode(cluster: &MetricCluster, meta: &Meta) -> Result<api::MetricCluster, Error> {
        Ok(api::MetricCluster {
            cid: None,
            description: cluster.description.clone(),
            name: cluster.name.clone(),
            queries: cluster
                .query
                .iter()
                .map(|q| api::ClusterQuery {
                    query: q.definition.clone(),
                    type_: q.type_.clone(),
                })
                .collect(),
            tags: tags::encode(&cluster.tags, meta),
        })
    }

    fn decode(wire: &api::MetricCluster, meta: &Meta) -> Result<MetricCluster, Error> {
        let mut query: Vec<ClusterQuery> = wire
            .queries
            .iter()
            .map(|q| ClusterQuery {
                definition: q.query.clone(),
                type_: q.type_.clone(),
            })
            .collect();
        query.sort();
        query.dedup();

        Ok(MetricCluster {
            description: wire.description.clone(),
            name: wire.name.clone(),
            query,
            tags: tags::decode(&wire.tags, meta),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_queries() {
        let wire: api::MetricCluster = serde_json::from_value(json!({
            "_cid": "/metric_cluster/3",
            "name": "disk",
            "queries": [
                {"query": "*fs`/var*", "type": "average"},
                {"query": "*fs`/*", "type": "count"},
                {"query": "*fs`/var*", "type": "average"},
            ],
            "tags": ["Team:Storage"],
        }))
        .unwrap();

        let cluster = MetricClusterTranslator::decode(&wire, &Meta::default()).unwrap();
        assert_eq!(cluster.query.len(), 2);
        assert_eq!(cluster.query[0].type_, "count");
        assert_eq!(cluster.tags.to_strings(), vec!["team:storage"]);
        assert!(cluster.validate().is_empty());

        let encoded = MetricClusterTranslator::encode(&cluster, &Meta::default()).unwrap();
        assert_eq!(encoded.queries[1].query, "*fs`/var*");
    }
}
