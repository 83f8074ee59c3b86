use crate::{tags, Error, Meta, Translator};
use models::{ids::Entity, SmartQuery, Worksheet};
use schema::{descriptions, Attribute, Kind, Schema, Validator};

pub struct WorksheetTranslator;

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("description", "Description of the worksheet"),
    ("favourite", "Mark the worksheet as a favourite"),
    ("graphs", "CIDs of the graphs of the worksheet, in display order"),
    ("notes", "Notes about the worksheet"),
    ("smart_queries", "Searches which add matching graphs to the worksheet"),
    ("smart_queries.name", "Name of the query"),
    ("smart_queries.order", "Graph CIDs in the order they're displayed"),
    ("smart_queries.query", "Graph search"),
    ("tags", "Tags of the worksheet"),
    ("title", "Title of the worksheet"),
];

impl Translator for WorksheetTranslator {
    const NAME: &'static str = "circonus_worksheet";

    type Model = Worksheet;
    type Wire = api::Worksheet;

    fn schema() -> Schema {
        let smart_query = Schema::new()
            .attr("name", Attribute::string().required())
            .attr(
                "order",
                Attribute::list(Kind::String).validate(Validator::Cid(Entity::Graph)),
            )
            .attr("query", Attribute::string().required());

        let mut schema = Schema::new()
            .attr("description", Attribute::string())
            .attr("favourite", Attribute::bool())
            .attr(
                "graphs",
                Attribute::list(Kind::String).validate(Validator::Cid(Entity::Graph)),
            )
            .attr("notes", Attribute::string())
            .attr("smart_queries", Attribute::list(Kind::Block(smart_query)))
            .attr("tags", tags::attribute())
            .attr("title", Attribute::string().required());

        descriptions::fuse(Self::NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn encode(worksheet: &Worksheet, meta: &Meta) -> Result<api::Worksheet, Error> {
        Ok(api::Worksheet {
            cid: None,
            description: worksheet.description.clone(),
            favorite: worksheet.favourite,
            graphs: worksheet
                .graphs
                .iter()
                .map(|graph| api::WorksheetGraph { graph: graph.clone() })
                .collect(),
            notes: worksheet.notes.clone(),
            smart_queries: worksheet
                .smart_queries
                .iter()
                .map(|q| api::SmartQuery {
                    name: q.name.clone(),
                    order: q.order.clone(),
                    query: q.query.clone(),
                })
                .collect(),
            tags: tags::encode(&worksheet.tags, meta),
            title: worksheet.title.clone(),
        })
    }

    fn decode(wire: &api::Worksheet, meta: &Meta) -> Result<Worksheet, Error> {
        Ok(Worksheet {
            description: wire.description.clone(),
            favourite: wire.favorite,
            graphs: wire.graphs.iter().map(|g| g.graph.clone()).collect(),
            notes: wire.notes.clone(),
            smart_queries: wire
                .smart_queries
                .iter()
                .map(|q| SmartQuery {
                    name: q.name.clone(),
                    order: q.order.clone(),
                    query: q.query.clone(),
                })
                .collect(),
            tags: tags::decode(&wire.tags, meta),
            title: wire.title.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graph_order_survives() {
        let worksheet: Worksheet = serde_json::from_value(json!({
            "title": "capacity",
            "favourite": true,
            "graphs": ["/graph/c", "/graph/a", "/graph/b"],
            "smart_queries": [{"name": "disks", "query": "disk*", "order": ["/graph/z"]}],
        }))
        .unwrap();

        let wire = WorksheetTranslator::encode(&worksheet, &Meta::default()).unwrap();
        assert!(wire.favorite);
        assert_eq!(wire.graphs[0].graph, "/graph/c");
        assert_eq!(WorksheetTranslator::decode(&wire, &Meta::default()).unwrap(), worksheet);
    }
}
