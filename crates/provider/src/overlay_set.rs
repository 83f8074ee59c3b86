//! Overlay sets are stored within the graph they decorate, keyed by an
//! identifier the provider assigns. The resource's identifier is
//! `<graph CID>#<overlay set id>`.

use crate::{error::fault, Context, Error, Meta, Resource};
use models::{ids::Entity, Overlay, OverlaySet, Seconds};
use schema::{descriptions, Attribute, Kind, ResourceData, Schema, Validator};
use serde_json::Value;

pub const NAME: &str = "circonus_overlay_set";

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("graph", "CID of the graph the overlays are drawn over"),
    ("overlays", "Overlays of the set"),
    ("overlays.decouple", "Draw the overlay against its own axis"),
    ("overlays.id", "Identifier of the overlay within its set"),
    ("overlays.label", "Legend label of the overlay"),
    ("overlays.type", "Kind of overlay"),
    ("overlays.x_shift", "Time shift of the overlay"),
    ("overlays.z", "Drawing order of the overlay"),
    ("title", "Title of the overlay set"),
];

pub struct OverlaySetResource;

fn parse_id(id: &str) -> Result<(&str, &str), Error> {
    match id.rsplit_once('#') {
        Some((graph, set)) if !graph.is_empty() && !set.is_empty() => Ok((graph, set)),
        _ => Err(Error::Validation {
            path: "id".to_string(),
            rule: format!("{id:?} is not of the form <graph CID>#<overlay set id>"),
        }),
    }
}

fn prepare(data: &dyn ResourceData) -> Result<(OverlaySet, api::OverlaySet), Error> {
    let violations = schema::validate(data.schema(), data.config());
    if !violations.is_empty() {
        return Err(Error::invalid(violations));
    }
    let set: OverlaySet = schema::decode_config(NAME, data)?;

    let violations = set.validate();
    if !violations.is_empty() {
        return Err(Error::invalid(violations));
    }
    let wire = encode(&set);
    Ok((set, wire))
}

pub fn encode(set: &OverlaySet) -> api::OverlaySet {
    let overlays = set
        .overlays
        .iter()
        .map(|o| {
            let overlay = api::Overlay {
                id: o.id.clone(),
                title: o.label.clone(),
                ui_specs: api::OverlayUiSpecs {
                    decouple: o.decouple,
                    id: o.id.clone(),
                    label: o.label.clone(),
                    type_: o.type_.clone(),
                    x_shift: o.x_shift.map(|s| format!("{}s", s.as_secs())),
                    z: o.z.map(|z| z.to_string()),
                },
            };
            (o.id.clone(), overlay)
        })
        .collect();

    api::OverlaySet {
        overlays,
        title: set.title.clone(),
    }
}

/// Decode the overlay set of `graph`. The platform keys overlays by id, so
/// they're ordered like `order`, with others following by id.
pub fn decode(graph: &str, wire: &api::OverlaySet, order: &[String]) -> OverlaySet {
    let mut overlays: Vec<Overlay> = wire
        .overlays
        .iter()
        .map(|(id, o)| {
            let specs = &o.ui_specs;
            Overlay {
                decouple: specs.decouple,
                id: id.clone(),
                label: specs.label.clone().or_else(|| o.title.clone()),
                type_: specs.type_.clone(),
                x_shift: specs.x_shift.as_deref().and_then(|s| match Seconds::parse(s) {
                    Ok(shift) => Some(shift),
                    Err(err) => {
                        fault(format_args!("overlay {id} has malformed x_shift: {err}"));
                        None
                    }
                }),
                z: specs.z.as_deref().and_then(|z| match z.trim().parse() {
                    Ok(z) => Some(z),
                    Err(err) => {
                        fault(format_args!("overlay {id} has malformed z {z:?}: {err}"));
                        None
                    }
                }),
            }
        })
        .collect();

    overlays.sort_by_key(|o| order.iter().position(|id| *id == o.id).unwrap_or(order.len()));

    OverlaySet {
        graph: graph.to_string(),
        overlays,
        title: wire.title.clone(),
    }
}

/// Overlay ids in their configured order.
fn configured_order(data: &dyn ResourceData) -> Vec<String> {
    match data.get("overlays") {
        Some(Value::Array(overlays)) => overlays
            .iter()
            .filter_map(|o| o.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn store(graph: &str, wire: &api::OverlaySet, data: &mut dyn ResourceData) -> Result<(), Error> {
    let set = decode(graph, wire, &configured_order(data));
    Ok(schema::encode_state(&set, data)?)
}

fn required_id(data: &dyn ResourceData) -> Result<String, Error> {
    data.id()
        .map(str::to_string)
        .ok_or_else(|| Error::Translation(format!("{NAME} has no identifier")))
}

#[async_trait::async_trait]
impl Resource for OverlaySetResource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn schema(&self) -> Schema {
        let overlay = Schema::new()
            .attr("decouple", Attribute::bool())
            .attr("id", Attribute::string().required())
            .attr("label", Attribute::string())
            .attr("type", Attribute::string())
            .attr("x_shift", Attribute::duration())
            .attr("z", Attribute::int());

        let mut schema = Schema::new()
            .attr(
                "graph",
                Attribute::string().required().validate(Validator::Cid(Entity::Graph)),
            )
            .attr("overlays", Attribute::list(Kind::Block(overlay)))
            .attr("title", Attribute::string().required());

        descriptions::fuse(NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn encode(&self, _meta: &Meta, data: &dyn ResourceData) -> Result<Value, Error> {
        let (_, wire) = prepare(data)?;
        serde_json::to_value(&wire).map_err(|err| Error::Translation(err.to_string()))
    }

    async fn create(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let (set, wire) = prepare(data)?;
        let key = uuid::Uuid::new_v4().to_string();

        ctx.call(NAME, &set.graph, ctx.client.put_overlay_set(&set.graph, &key, wire.clone()))
            .await?;
        let id = format!("{}#{key}", set.graph);
        tracing::info!(resource = NAME, %id, "created");

        data.set_id(Some(id));
        store(&set.graph, &wire, data)
    }

    async fn read(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let id = required_id(data)?;
        let (graph, key) = parse_id(&id)?;

        match ctx.call(NAME, &id, ctx.client.fetch_overlay_set(graph, key)).await {
            Ok(wire) => store(graph, &wire, data),
            Err(err) if err.is_not_found() => {
                tracing::warn!(resource = NAME, %id, "resource no longer exists");
                data.set_id(None);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn update(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let id = required_id(data)?;
        let (graph, key) = parse_id(&id)?;
        let (set, wire) = prepare(data)?;

        // An overlay set which moves to another graph keeps its key.
        if set.graph != graph {
            match ctx.call(NAME, &id, ctx.client.delete_overlay_set(graph, key)).await {
                Ok(()) => (),
                Err(err) if err.is_not_found() => (),
                Err(err) => return Err(err),
            }
        }
        ctx.call(NAME, &id, ctx.client.put_overlay_set(&set.graph, key, wire.clone()))
            .await?;

        let next = format!("{}#{key}", set.graph);
        tracing::info!(resource = NAME, id = %next, "updated");
        data.set_id(Some(next));
        store(&set.graph, &wire, data)
    }

    async fn delete(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let id = required_id(data)?;
        let (graph, key) = parse_id(&id)?;

        match ctx.call(NAME, &id, ctx.client.delete_overlay_set(graph, key)).await {
            Ok(()) => (),
            Err(err) if err.is_not_found() => {
                tracing::warn!(resource = NAME, %id, "resource was already deleted");
            }
            Err(err) => return Err(err),
        }
        data.set_id(None);
        Ok(())
    }

    async fn exists(&self, ctx: &Context, data: &dyn ResourceData) -> Result<bool, Error> {
        let Some(id) = data.id() else {
            return Ok(false);
        };
        let (graph, key) = parse_id(id)?;

        match ctx.call(NAME, id, ctx.client.fetch_overlay_set(graph, key)).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids() {
        assert_eq!(parse_id("/graph/abc-1#xyz").unwrap(), ("/graph/abc-1", "xyz"));
        assert!(parse_id("/graph/abc-1").is_err());
        assert!(parse_id("#xyz").is_err());
    }

    #[test]
    fn test_overlay_order_follows_configuration() {
        let set: OverlaySet = serde_json::from_value(json!({
            "graph": "/graph/abc",
            "title": "week over week",
            "overlays": [
                {"id": "zz", "label": "last week", "x_shift": "604800", "z": 2},
                {"id": "aa", "label": "yesterday", "x_shift": "86400", "decouple": true},
            ],
        }))
        .unwrap();

        let wire = encode(&set);
        assert_eq!(wire.overlays["zz"].ui_specs.x_shift.as_deref(), Some("604800s"));
        assert_eq!(wire.overlays["zz"].ui_specs.z.as_deref(), Some("2"));

        let order = vec!["zz".to_string(), "aa".to_string()];
        assert_eq!(decode("/graph/abc", &wire, &order), set);

        let unordered = decode("/graph/abc", &wire, &[]);
        assert_eq!(unordered.overlays[0].id, "aa");
    }
}
