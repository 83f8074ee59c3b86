use crate::{error::fault, provider_bug, tags, Error, Meta, Translator};
use api::Severity;
use models::{
    format_timestamp, ids::Entity, parse_timestamp, Maintenance, MaintenanceTarget, Violation,
    MAX_SEVERITY, MIN_SEVERITY,
};
use schema::{descriptions, Attribute, Kind, Schema, Validator};

pub struct MaintenanceTranslator;

const TARGETS: &[&str] = &["account", "check", "host", "rule_set"];

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("account", "CID of the account placed in maintenance"),
    ("check", "CID of the check placed in maintenance"),
    ("host", "Host placed in maintenance, matched against check targets"),
    ("notes", "Notes about the window"),
    ("rule_set", "CID of the rule set placed in maintenance"),
    ("severities", "Severities of alerts suppressed during the window"),
    ("start", "RFC 3339 time at which the window opens"),
    ("stop", "RFC 3339 time at which the window closes"),
    ("tags", "Tags of the window"),
];

/// Timestamps are kept in UTC, so that offsets don't read as changes.
fn canonical_timestamp(value: &str) -> String {
    parse_timestamp(value)
        .and_then(format_timestamp)
        .unwrap_or_else(|_| value.to_string())
}

fn timestamp() -> Attribute {
    Attribute::string()
        .required()
        .validate(Validator::regex(r"^\d{4}-\d{2}-\d{2}T"))
        .state_func(canonical_timestamp)
}

impl Translator for MaintenanceTranslator {
    const NAME: &'static str = "circonus_maintenance";

    type Model = Maintenance;
    type Wire = api::Maintenance;

    fn schema() -> Schema {
        let mut schema = Schema::new()
            .attr("account", Attribute::string().validate(Validator::Cid(Entity::Account)))
            .attr("check", Attribute::string().validate(Validator::Cid(Entity::Check)))
            .attr("host", Attribute::string())
            .attr("notes", Attribute::string())
            .attr("rule_set", Attribute::string().validate(Validator::Cid(Entity::RuleSet)))
            .attr(
                "severities",
                Attribute::set(Kind::Int)
                    .required()
                    .min_items(1)
                    .validate(Validator::IntRange {
                        min: MIN_SEVERITY as i64,
                        max: MAX_SEVERITY as i64,
                    }),
            )
            .attr("start", timestamp())
            .attr("stop", timestamp())
            .attr("tags", tags::attribute())
            .exactly_one_of(TARGETS);

        descriptions::fuse(Self::NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn validate(window: &Maintenance) -> Vec<Violation> {
        window.validate()
    }

    fn encode(window: &Maintenance, meta: &Meta) -> Result<api::Maintenance, Error> {
        let epoch = |attr: &str, value: &str| {
            parse_timestamp(value).map_err(|err| Error::Validation {
                path: attr.to_string(),
                rule: err.to_string(),
            })
        };

        Ok(api::Maintenance {
            cid: None,
            item: window.target.item().to_string(),
            notes: window.notes.clone(),
            severities: window.severities.iter().map(|s| Severity::from(*s)).collect(),
            start: epoch("start", &window.start)?,
            stop: epoch("stop", &window.stop)?,
            tags: tags::encode(&window.tags, meta),
            type_: window.target.kind().to_string(),
        })
    }

    fn decode(wire: &api::Maintenance, meta: &Meta) -> Result<Maintenance, Error> {
        let target = MaintenanceTarget::from_parts(&wire.type_, wire.item.clone()).ok_or_else(
            || provider_bug(format!("maintenance has unknown item type {:?}", wire.type_)),
        )?;

        let timestamp = |epoch: i64| {
            format_timestamp(epoch).map_err(|err| provider_bug(format!("maintenance {err}")))
        };

        let severities = wire
            .severities
            .iter()
            .filter_map(|sev| match sev.normalize() {
                Some(s) if (MIN_SEVERITY..=MAX_SEVERITY).contains(&s) => Some(s),
                _ => {
                    fault(format_args!("maintenance has malformed severity {sev:?}"));
                    None
                }
            })
            .collect();

        Ok(Maintenance {
            target,
            notes: wire.notes.clone(),
            severities,
            start: timestamp(wire.start)?,
            stop: timestamp(wire.stop)?,
            tags: tags::decode(&wire.tags, meta),
        })
    }
}
