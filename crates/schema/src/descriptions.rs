use crate::{Attribute, Schema};
use std::collections::BTreeMap;

/// Fuse a table of attribute descriptions, keyed by dotted attribute name
/// (`if.value.over.last`), into the schema of `resource`.
///
/// Descriptions are documentation: a missing or unknown description is
/// logged and never an error.
pub fn fuse(resource: &str, schema: &mut Schema, descriptions: &[(&str, &str)]) {
    let mut table: BTreeMap<&str, &str> = descriptions.iter().copied().collect();

    schema.walk_mut(&mut |name: &str, attr: &mut Attribute| match table.remove(name) {
        Some(description) => attr.description = Some(description.to_string()),
        None if attr.description.is_some() => (),
        None => tracing::warn!(%resource, attribute = %name, "attribute has no description"),
    });

    for name in table.keys() {
        tracing::warn!(%resource, attribute = %name, "description of an unknown attribute");
    }
}

#[cfg(test)]
mod test {
    use super::fuse;
    use crate::{Attribute, Kind, Schema};

    #[test]
    fn test_fusion() {
        let mut schema = Schema::new()
            .attr("name", Attribute::string())
            .attr(
                "metric",
                Attribute::set(Kind::Block(Schema::new().attr("unit", Attribute::string()))),
            )
            .attr("notes", Attribute::string().describe("Free-form notes"));

        fuse(
            "check",
            &mut schema,
            &[
                ("name", "Name of the check"),
                ("metric.unit", "Unit of the metric"),
                ("bogus", "Not an attribute"),
            ],
        );

        let described: Vec<_> = ["name", "metric", "notes"]
            .iter()
            .map(|n| schema.get(n).unwrap().description.clone())
            .collect();
        assert_eq!(
            described,
            vec![
                Some("Name of the check".to_string()),
                None,
                Some("Free-form notes".to_string()),
            ]
        );
        let Kind::Set(of) = &schema.get("metric").unwrap().kind else {
            panic!("metric is a set")
        };
        assert_eq!(
            of.block().unwrap().get("unit").unwrap().description.as_deref(),
            Some("Unit of the metric")
        );
    }
}
