//! The check resource: a check bundle's common attributes, plus exactly one
//! variant block holding its type-specific configuration.

use crate::{
    hashing::{sum, Field},
    provider_bug, tags, Error, Meta, Translator,
};
use api::{
    BundleMetric, CheckBundle, METRIC_ACTIVE, METRIC_AVAILABLE, STATUS_ACTIVE, STATUS_DISABLED,
};
use models::{
    ids::Entity, Check, CheckVariant, Collector, FilterType, MetricDef, MetricFilter, MetricType,
    Seconds, Violation,
};
use schema::{descriptions, Attribute, Kind, ResourceData, Schema, Validator};
use serde_json::Value;

pub mod swamp;
pub mod variants;

use swamp::Swamp;

pub const DEFAULT_PERIOD: Seconds = Seconds(60);
pub const DEFAULT_TIMEOUT: f64 = 10.0;

pub struct CheckTranslator;

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("active", "Whether the check is enabled"),
    ("collector", "Collectors which run the check"),
    ("collector.id", "CID of the collector"),
    ("metric", "Metrics collected by the check"),
    ("metric.active", "Whether the metric is collected"),
    ("metric.name", "Name of the metric"),
    ("metric.tags", "Tags of the metric"),
    ("metric.type", "Kind of values the metric carries"),
    ("metric.unit", "Unit of the metric's values"),
    ("metric_filter", "Ordered rules which allow or deny metrics by name"),
    ("metric_filter.comment", "Note about the rule"),
    ("metric_filter.regex", "Regex of metric names the rule matches"),
    ("metric_filter.type", "Whether matching metrics are allowed or denied"),
    ("name", "Display name, defaulting to the check type and target"),
    ("notes", "Free-form notes"),
    ("period", "Interval between runs of the check"),
    ("target", "Host which the check runs against"),
    ("timeout", "Seconds a run may take before it's abandoned"),
    ("check_by_collector", "Map of collector CID to the CID of the check it runs"),
    ("check_id", "CID of the check run by the first collector"),
    ("checks", "CIDs of the checks, one per collector"),
    ("created", "Creation time, in epoch seconds"),
    ("last_modified", "Last modification time, in epoch seconds"),
    ("last_modified_by", "User who last modified the check"),
    ("reverse_connect_urls", "URLs through which collectors reverse-connect"),
    ("uuids", "UUIDs of the checks, one per collector"),
];

const METRIC_FIELDS: &[Field] = &[
    Field::Bool("active"),
    Field::Str("name"),
    Field::Set("tags"),
    Field::Str("type"),
    Field::Str("unit"),
];

fn metric_hash(v: &Value) -> u32 {
    sum(v, METRIC_FIELDS)
}

fn collector_hash(v: &Value) -> u32 {
    sum(v, &[Field::Str("id")])
}

fn common_schema() -> Schema {
    let collector = Schema::new().attr(
        "id",
        Attribute::string().required().validate(Validator::Cid(Entity::Broker)),
    );
    let metric = Schema::new()
        .attr("active", Attribute::bool().default(true))
        .attr("name", Attribute::string().required())
        .attr("tags", tags::attribute())
        .attr(
            "type",
            Attribute::string().required().validate(Validator::OneOf(MetricType::ALL)),
        )
        .attr("unit", Attribute::string());
    let filter = Schema::new()
        .attr("comment", Attribute::string())
        .attr("regex", Attribute::string().required())
        .attr(
            "type",
            Attribute::string().required().validate(Validator::OneOf(&["allow", "deny"])),
        );

    Schema::new()
        .attr("active", Attribute::bool().default(true))
        .attr(
            "collector",
            Attribute::set(Kind::Block(collector))
                .required()
                .min_items(1)
                .hash_with(collector_hash),
        )
        .attr("metric", Attribute::set(Kind::Block(metric)).hash_with(metric_hash))
        .attr("metric_filter", Attribute::list(Kind::Block(filter)))
        .attr("name", Attribute::string().optional_computed())
        .attr("notes", Attribute::string())
        .attr(
            "period",
            Attribute::duration()
                .default(DEFAULT_PERIOD.to_string())
                .validate(Validator::Duration {
                    min: Some(30),
                    max: Some(300),
                }),
        )
        .attr("tags", tags::attribute())
        .attr("target", Attribute::string().optional_computed())
        .attr(
            "timeout",
            Attribute::float()
                .default(DEFAULT_TIMEOUT)
                .validate(Validator::FloatRange { min: 0.0, max: 300.0 }),
        )
        .attr("check_by_collector", Attribute::map(Kind::String).computed())
        .attr("check_id", Attribute::string().computed())
        .attr("checks", Attribute::list(Kind::String).computed())
        .attr("created", Attribute::int().computed())
        .attr("last_modified", Attribute::int().computed())
        .attr("last_modified_by", Attribute::string().computed())
        .attr("reverse_connect_urls", Attribute::list(Kind::String).computed())
        .attr("uuids", Attribute::list(Kind::String).computed())
}

impl Translator for CheckTranslator {
    const NAME: &'static str = "circonus_check";

    type Model = Check;
    type Wire = CheckBundle;

    fn schema() -> Schema {
        let mut schema = variants::VARIANTS.iter().fold(common_schema(), |schema, v| {
            schema.attr(
                v.name,
                Attribute::set(Kind::Block((v.schema)()))
                    .max_items(1)
                    .hash_with(v.hash)
                    .describe(v.description),
            )
        });
        schema = schema.exactly_one_of(CheckVariant::NAMES);

        let table: Vec<(&str, &str)> = DESCRIPTIONS
            .iter()
            .chain(variants::VARIANTS.iter().flat_map(|v| v.descriptions))
            .copied()
            .collect();
        descriptions::fuse(Self::NAME, &mut schema, &table);
        schema
    }

    fn validate(check: &Check) -> Vec<Violation> {
        check.validate()
    }

    fn encode(check: &Check, meta: &Meta) -> Result<CheckBundle, Error> {
        let mut rolled_up = check.tags.clone();

        let metrics = check
            .metric
            .iter()
            .map(|metric| {
                if meta.auto_tag {
                    rolled_up.extend(&metric.tags);
                }
                BundleMetric {
                    name: metric.name.clone(),
                    status: if metric.active { METRIC_ACTIVE } else { METRIC_AVAILABLE }.to_string(),
                    tags: tags::encode(&metric.tags, meta),
                    type_: metric.type_.as_str().to_string(),
                    units: metric.unit.clone(),
                }
            })
            .collect();

        let metric_filters = check
            .metric_filter
            .iter()
            .map(|filter| {
                let mut rule = vec![filter.type_.as_str().to_string(), filter.regex.clone()];
                rule.extend(filter.comment.clone());
                rule
            })
            .collect();

        let mut bundle = CheckBundle {
            brokers: check.collector.iter().map(|c| c.id.clone()).collect(),
            metric_filters,
            metrics,
            notes: check.notes.clone(),
            period: check.period.unwrap_or(DEFAULT_PERIOD).as_secs(),
            status: if check.active { STATUS_ACTIVE } else { STATUS_DISABLED }.to_string(),
            tags: tags::encode(&rolled_up, meta),
            target: check.target.clone().unwrap_or_default(),
            timeout: check.timeout.unwrap_or(DEFAULT_TIMEOUT),
            ..Default::default()
        };
        variants::encode(&check.variant, &mut bundle);

        if bundle.target.is_empty() {
            return Err(Error::Validation {
                path: "target".to_string(),
                rule: format!("{} checks require a target", check.variant.name()),
            });
        }
        bundle.display_name = match &check.name {
            Some(name) => name.clone(),
            None => format!("{} {}", check.variant.name(), bundle.target),
        };
        Ok(bundle)
    }

    fn decode(bundle: &CheckBundle, meta: &Meta) -> Result<Check, Error> {
        let mut swamp = Swamp::new(&bundle.type_, &bundle.config);
        let variant = variants::decode(bundle, &mut swamp)?;
        swamp.finish()?;

        let mut check = Check::new(variant);
        check.active = bundle.status != STATUS_DISABLED;
        check.collector = bundle
            .brokers
            .iter()
            .map(|id| Collector { id: id.clone() })
            .collect();
        check.metric = bundle
            .metrics
            .iter()
            .map(|metric| decode_metric(metric, meta))
            .collect::<Result<_, _>>()?;
        check.metric_filter = bundle
            .metric_filters
            .iter()
            .map(|rule| decode_filter(rule))
            .collect::<Result<_, _>>()?;
        check.name = non_empty(&bundle.display_name);
        check.notes = bundle.notes.as_deref().and_then(non_empty);
        check.period = (bundle.period != 0).then_some(Seconds(bundle.period));
        check.tags = tags::decode(&bundle.tags, meta);
        check.target = non_empty(&bundle.target);
        check.timeout = Some(bundle.timeout);

        check.check_by_collector = bundle
            .brokers
            .iter()
            .cloned()
            .zip(bundle.checks.iter().cloned())
            .collect();
        check.check_id = bundle.checks.first().cloned();
        check.checks = bundle.checks.clone();
        check.created = bundle.created;
        check.last_modified = bundle.last_modified;
        check.last_modified_by = bundle.last_modified_by.clone();
        check.reverse_connect_urls = bundle.reverse_connection_urls.clone();
        check.uuids = bundle.check_uuids.clone();

        Ok(check)
    }

    /// Variant blocks are sets of at most one element in configuration,
    /// and a single object in the model.
    fn load(data: &dyn ResourceData) -> Result<Check, Error> {
        let mut config = data.config().clone();

        if let Value::Object(map) = &mut config {
            for name in CheckVariant::NAMES {
                if let Some(Value::Array(items)) = map.get_mut(*name) {
                    let item = items.pop().unwrap_or_default();
                    map.insert(name.to_string(), item);
                }
            }
        }
        serde_json::from_value(config).map_err(|source| {
            Error::State(schema::Error::Decode {
                what: Self::NAME,
                source,
            })
        })
    }

    fn store(check: &Check, data: &mut dyn ResourceData) -> Result<(), Error> {
        let name = check.variant.name();
        let configured = data.config().get(name).and_then(|block| block.get(0)).cloned();

        let mut check = check.clone();
        variants::elide_derived_port(&mut check.variant, configured.as_ref());
        let mut state = serde_json::to_value(&check).map_err(schema::Error::Encode)?;

        if let Some(block) = state.get_mut(name) {
            *block = Value::Array(vec![block.take()]);
        }
        Ok(data.set("", state)?)
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn decode_metric(metric: &BundleMetric, meta: &Meta) -> Result<MetricDef, Error> {
    let type_ = MetricType::parse(&metric.type_).ok_or_else(|| {
        provider_bug(format!(
            "metric {:?} has unknown type {:?}",
            metric.name, metric.type_
        ))
    })?;

    Ok(MetricDef {
        active: metric.status == METRIC_ACTIVE,
        name: metric.name.clone(),
        tags: tags::decode(&metric.tags, meta),
        type_,
        unit: metric.units.as_deref().and_then(non_empty),
    })
}

fn decode_filter(rule: &[String]) -> Result<MetricFilter, Error> {
    let (type_, regex, comment) = match rule {
        [type_, regex] => (type_, regex, None),
        [type_, regex, comment] => (type_, regex, non_empty(comment)),
        _ => return Err(provider_bug(format!("malformed metric filter {rule:?}"))),
    };
    let type_ = match type_.as_str() {
        "allow" => FilterType::Allow,
        "deny" => FilterType::Deny,
        other => return Err(provider_bug(format!("unknown metric filter type {other:?}"))),
    };
    Ok(MetricFilter {
        comment,
        regex: regex.clone(),
        type_,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use models::{checks::variants::Dns, Tags};
    use schema::MemoryData;
    use serde_json::json;
    use std::sync::Arc;

    fn dns_check() -> Check {
        let mut check = Check::new(CheckVariant::Dns(Dns {
            ctype: Some("IN".to_string()),
            nameserver: Some("%[target]".to_string()),
            query: "example.com".to_string(),
            rtype: Some("A".to_string()),
        }));
        check.collector = vec![Collector {
            id: "/broker/1".to_string(),
        }];
        check.target = Some("ns1.example.com".to_string());
        check.metric = vec![MetricDef {
            active: true,
            name: "rtt".to_string(),
            tags: ["service:dns"].into_iter().collect(),
            type_: MetricType::Numeric,
            unit: Some("seconds".to_string()),
        }];
        check
    }

    #[test]
    fn test_auto_tag_rolls_up_metric_tags() {
        let meta = Meta {
            auto_tag: true,
            ..Meta::default()
        };
        let mut check = dns_check();
        check.tags = ["env:prod"].into_iter().collect();

        let bundle = CheckTranslator::encode(&check, &meta).unwrap();
        assert_eq!(bundle.tags, vec!["author:terraform", "env:prod", "service:dns"]);
        assert_eq!(bundle.metrics[0].tags, vec!["author:terraform", "service:dns"]);
        assert_eq!(bundle.display_name, "dns ns1.example.com");

        let decoded = CheckTranslator::decode(&bundle, &meta).unwrap();
        assert_eq!(decoded.metric, check.metric);
        assert_eq!(
            decoded.tags,
            ["env:prod", "service:dns"].into_iter().collect::<Tags>()
        );

        let bundle = CheckTranslator::encode(&check, &Meta::default()).unwrap();
        assert_eq!(bundle.tags, vec!["env:prod"]);
    }

    #[test]
    fn test_target_is_required() {
        let mut check = dns_check();
        check.target = None;

        let err = CheckTranslator::encode(&check, &Meta::default()).unwrap_err();
        assert_eq!(err.to_string(), "target: dns checks require a target");
    }

    #[test]
    fn test_variant_block_wrapping() {
        let schema = Arc::new(CheckTranslator::schema());
        let mut data = MemoryData::new(
            schema,
            &json!({
                "collector": [{"id": "/broker/1"}],
                "target": "ns1.example.com",
                "dns": [{"query": "example.com"}],
            }),
        );

        let check = CheckTranslator::load(&data).unwrap();
        let CheckVariant::Dns(dns) = &check.variant else {
            panic!("expected a dns check, not {}", check.variant.name());
        };
        assert_eq!(dns.rtype.as_deref(), Some("A"));
        assert_eq!(check.period, Some(DEFAULT_PERIOD));

        CheckTranslator::store(&check, &mut data).unwrap();
        assert_eq!(data.state()["dns"], data.config()["dns"]);
        assert_eq!(data.state()["period"], json!("60"));
    }

    #[test]
    fn test_metric_filters_keep_order() {
        let rules = vec![
            vec!["deny".to_string(), "^debug_".to_string(), "noisy".to_string()],
            vec!["allow".to_string(), ".".to_string()],
        ];
        let filters: Vec<_> = rules
            .iter()
            .map(|r| decode_filter(r).unwrap())
            .collect();
        assert_eq!(filters[0].type_, FilterType::Deny);
        assert_eq!(filters[0].comment.as_deref(), Some("noisy"));
        assert_eq!(filters[1].regex, ".");

        assert!(decode_filter(&["sometimes".to_string(), "x".to_string()]).is_err());
    }
}
