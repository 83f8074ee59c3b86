use crate::{error::fault, provider_bug, tags, Error, Meta, Translator};
use api::Severity;
use models::{
    ids::Entity, parse_float_seconds, Criteria, RuleIf, RuleMetricType, RuleOver, RuleSet,
    RuleThen, RuleValue, Seconds, Violation, WindowFunction, MIN_SEVERITY,
};
use schema::{descriptions, Attribute, Kind, Schema, Validator};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

pub struct RuleSetTranslator;

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("check", "CID of the check whose metric is evaluated"),
    ("if", "Ordered rules, the first of which to match determines the alert"),
    ("if.then", "Notification raised when the rule matches"),
    ("if.then.after", "Delay before notifying, in whole minutes"),
    ("if.then.notify", "Contact groups to notify"),
    ("if.then.severity", "Severity of the alert, where 0 clears it"),
    ("if.value", "Predicate of the rule"),
    ("if.value.absent", "Match when no data arrives for this long"),
    ("if.value.changed", "Match when a text metric changes"),
    ("if.value.contains", "Match text metrics containing this substring"),
    ("if.value.match", "Match text metrics equal to this value"),
    ("if.value.max_value", "Match numeric metrics above this value"),
    ("if.value.min_value", "Match numeric metrics below this value"),
    ("if.value.not_contain", "Match text metrics not containing this substring"),
    ("if.value.not_match", "Match text metrics not equal to this value"),
    ("if.value.over", "Window over which the metric is aggregated first"),
    ("if.value.over.atleast", "Minimum duration of data the window must hold"),
    ("if.value.over.last", "Duration of the window"),
    ("if.value.over.using", "Function aggregating the window"),
    ("link", "URL included in notifications"),
    ("metric_filter", "Tag filter of metrics matched by metric_pattern"),
    ("metric_name", "Name of the metric to evaluate"),
    ("metric_pattern", "Regex of metric names to evaluate"),
    ("metric_type", "Kind of metric evaluated, numeric or text"),
    ("notes", "Notes included in notifications"),
    ("parent", "CID of a rule set which suppresses this one while alerting"),
    ("tags", "Tags of the rule set"),
];

impl Translator for RuleSetTranslator {
    const NAME: &'static str = "circonus_rule_set";

    type Model = RuleSet;
    type Wire = api::RuleSet;

    fn schema() -> Schema {
        let over = Schema::new()
            .attr("atleast", Attribute::duration())
            .attr("last", Attribute::duration().required())
            .attr(
                "using",
                Attribute::string()
                    .required()
                    .validate(Validator::OneOf(WindowFunction::ALL)),
            );
        let value = Schema::new()
            .attr("absent", Attribute::duration())
            .attr("changed", Attribute::string())
            .attr("contains", Attribute::string())
            .attr("match", Attribute::string())
            .attr("max_value", Attribute::string())
            .attr("min_value", Attribute::string())
            .attr("not_contain", Attribute::string())
            .attr("not_match", Attribute::string())
            .attr("over", Attribute::block(over));
        let then = Schema::new()
            .attr("after", Attribute::duration())
            .attr(
                "notify",
                Attribute::set(Kind::String).validate(Validator::Cid(Entity::ContactGroup)),
            )
            .attr(
                "severity",
                Attribute::int()
                    .default(1)
                    .validate(Validator::IntRange { min: 0, max: 5 }),
            );
        let rule = Schema::new()
            .attr("then", Attribute::block(then).default(json!({"severity": MIN_SEVERITY})))
            .attr("value", Attribute::block(value).required());

        let mut schema = Schema::new()
            .attr(
                "check",
                Attribute::string().required().validate(Validator::Cid(Entity::Check)),
            )
            .attr("if", Attribute::list(Kind::Block(rule)).required().min_items(1))
            .attr("link", Attribute::string().validate(Validator::Url { schemes: &["http", "https"] }))
            .attr("metric_filter", Attribute::string())
            .attr("metric_name", Attribute::string())
            .attr("metric_pattern", Attribute::string())
            .attr(
                "metric_type",
                Attribute::string()
                    .default(RuleMetricType::Numeric.as_str())
                    .validate(Validator::OneOf(&["numeric", "text"])),
            )
            .attr("notes", Attribute::string())
            .attr("parent", Attribute::string().validate(Validator::Cid(Entity::RuleSet)))
            .attr("tags", tags::attribute());

        descriptions::fuse(Self::NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn validate(rule_set: &RuleSet) -> Vec<Violation> {
        rule_set.validate()
    }

    fn encode(rule_set: &RuleSet, meta: &Meta) -> Result<api::RuleSet, Error> {
        let mut contact_groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut rules = Vec::with_capacity(rule_set.rules.len());

        for (index, rule) in rule_set.rules.iter().enumerate() {
            let (criteria, value) = rule.value.predicate().map_err(|v| Error::Validation {
                path: format!("if.{index}.{}", v.path),
                rule: v.rule,
            })?;

            let value = match criteria {
                Criteria::OnAbsence => {
                    let secs = rule.value.absent.map(|s| s.as_secs()).unwrap_or_default();
                    api::RuleValue::Int(secs as i64)
                }
                Criteria::OnChange => api::RuleValue::String(String::new()),
                _ => api::RuleValue::String(value),
            };

            let then = &rule.then;
            if !then.notify.is_empty() {
                contact_groups
                    .entry(then.severity.to_string())
                    .or_default()
                    .extend(then.notify.iter().cloned());
            }

            let over = rule.value.over.as_ref();
            rules.push(api::Rule {
                criteria: criteria.as_wire().to_string(),
                severity: Some(Severity::from(then.severity)),
                value,
                wait: then.after.map(|a| a.as_minutes()).unwrap_or_default(),
                windowing_duration: over.map(|o| o.last.as_secs()),
                windowing_function: over.map(|o| o.using.as_str().to_string()),
                windowing_min_duration: over.and_then(|o| o.atleast).map(|s| s.as_secs()),
            });
        }

        Ok(api::RuleSet {
            cid: None,
            check: rule_set.check.clone(),
            contact_groups: contact_groups
                .into_iter()
                .map(|(sev, groups)| (sev, groups.into_iter().collect()))
                .collect(),
            filter: rule_set.metric_filter.clone(),
            link: rule_set.link.clone(),
            metric_name: rule_set.metric_name.clone(),
            metric_pattern: rule_set.metric_pattern.clone(),
            metric_type: rule_set.metric_type.as_str().to_string(),
            notes: rule_set.notes.clone(),
            parent: rule_set.parent.clone(),
            rules,
            tags: tags::encode(&rule_set.tags, meta),
        })
    }

    fn decode(wire: &api::RuleSet, meta: &Meta) -> Result<RuleSet, Error> {
        let metric_type = match wire.metric_type.as_str() {
            "numeric" | "" => RuleMetricType::Numeric,
            "text" => RuleMetricType::Text,
            other => {
                fault(format_args!("rule set has unknown metric_type {other:?}"));
                RuleMetricType::Numeric
            }
        };

        let rules = wire
            .rules
            .iter()
            .map(|rule| decode_rule(rule, &wire.contact_groups))
            .collect::<Result<_, _>>()?;

        Ok(RuleSet {
            check: wire.check.clone(),
            rules,
            link: wire.link.clone(),
            metric_filter: wire.filter.clone(),
            metric_name: wire.metric_name.clone(),
            metric_pattern: wire.metric_pattern.clone(),
            metric_type,
            notes: wire.notes.clone(),
            parent: wire.parent.clone(),
            tags: tags::decode(&wire.tags, meta),
        })
    }
}

fn decode_rule(
    rule: &api::Rule,
    contact_groups: &BTreeMap<String, Vec<String>>,
) -> Result<RuleIf, Error> {
    let criteria = Criteria::from_wire(&rule.criteria)
        .ok_or_else(|| provider_bug(format!("rule has unknown criteria {:?}", rule.criteria)))?;

    let mut value = match (criteria, &rule.value) {
        (Criteria::OnAbsence, api::RuleValue::Int(secs)) => RuleValue {
            absent: Some(Seconds::new((*secs).max(0) as u64)),
            ..Default::default()
        },
        (Criteria::OnAbsence, api::RuleValue::Float(secs)) => RuleValue {
            absent: Some(Seconds::new(secs.max(0.0) as u64)),
            ..Default::default()
        },
        (Criteria::OnAbsence, api::RuleValue::String(s)) => match parse_float_seconds(s) {
            Ok(secs) => RuleValue {
                absent: Some(Seconds::new(secs as u64)),
                ..Default::default()
            },
            Err(err) => {
                fault(format_args!("rule has unparseable absence {s:?}: {err}"));
                RuleValue::default()
            }
        },
        (Criteria::OnChange, _) => RuleValue::from_predicate(criteria, "true".to_string()),
        (_, value) => RuleValue::from_predicate(criteria, value.to_string()),
    };

    if let Some(function) = &rule.windowing_function {
        match WindowFunction::parse(function) {
            Some(using) => {
                value.over = Some(RuleOver {
                    atleast: rule
                        .windowing_min_duration
                        .filter(|secs| *secs != 0)
                        .map(Seconds::new),
                    last: Seconds::new(rule.windowing_duration.unwrap_or_default()),
                    using,
                })
            }
            None => fault(format_args!("rule has unknown windowing function {function:?}")),
        }
    }

    let severity = match &rule.severity {
        Some(sev) => sev.normalize().unwrap_or_else(|| {
            fault(format_args!("rule has malformed severity {sev:?}"));
            0
        }),
        None => 0,
    };
    let notify = contact_groups
        .get(&severity.to_string())
        .map(|groups| groups.iter().cloned().collect())
        .unwrap_or_default();

    Ok(RuleIf {
        then: RuleThen {
            after: (rule.wait != 0).then(|| Seconds::from_minutes(rule.wait)),
            notify,
            severity,
        },
        value,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn rule_set(rules: serde_json::Value) -> RuleSet {
        serde_json::from_value(json!({
            "check": "/check/12",
            "metric_name": "rtt",
            "if": rules,
        }))
        .unwrap()
    }

    #[test]
    fn test_windowing() {
        let model = rule_set(json!([{
            "value": {"max_value": "300", "over": {"last": "300", "using": "average", "atleast": "60"}},
            "then": {"severity": 2, "after": "120"},
        }]));
        let wire = RuleSetTranslator::encode(&model, &Meta::default()).unwrap();
        let rule = &wire.rules[0];

        assert_eq!(rule.criteria, "max value");
        assert_eq!(rule.value, api::RuleValue::String("300".to_string()));
        assert_eq!(rule.wait, 2);
        assert_eq!(rule.windowing_duration, Some(300));
        assert_eq!(rule.windowing_function.as_deref(), Some("average"));
        assert_eq!(rule.windowing_min_duration, Some(60));

        assert_eq!(RuleSetTranslator::decode(&wire, &Meta::default()).unwrap(), model);
    }

    #[test]
    fn test_rule_without_then() {
        use schema::ResourceData;

        let model = rule_set(json!([{"value": {"max_value": "1"}}]));
        assert_eq!(model.rules[0].then.severity, 1);

        let wire = RuleSetTranslator::encode(&model, &Meta::default()).unwrap();
        assert_eq!(wire.rules[0].severity.as_ref().and_then(Severity::normalize), Some(1));

        let data = schema::MemoryData::new(
            std::sync::Arc::new(RuleSetTranslator::schema()),
            &json!({"check": "/check/12", "metric_name": "rtt", "if": [{"value": {"max_value": "1"}}]}),
        );
        assert_eq!(data.config()["if"][0]["then"], json!({"severity": 1}));
    }

    #[test]
    fn test_on_change() {
        let model = rule_set(json!([{"value": {"changed": "true"}, "then": {"severity": 1}}]));
        let wire = RuleSetTranslator::encode(&model, &Meta::default()).unwrap();

        assert_eq!(wire.rules[0].criteria, "on change");
        assert_eq!(wire.rules[0].value, api::RuleValue::String(String::new()));
        assert_eq!(RuleSetTranslator::decode(&wire, &Meta::default()).unwrap(), model);
    }

    #[test]
    fn test_absence_from_float_string() {
        let wire = api::RuleSet {
            check: "/check/12".to_string(),
            metric_name: Some("rtt".to_string()),
            metric_type: "numeric".to_string(),
            rules: vec![api::Rule {
                criteria: "on absence".to_string(),
                severity: Some(Severity::String("1".to_string())),
                value: api::RuleValue::String("900.0".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let decoded = RuleSetTranslator::decode(&wire, &Meta::default()).unwrap();
        assert_eq!(decoded.rules[0].value.absent, Some(Seconds::new(900)));
        assert_eq!(decoded.rules[0].then.severity, 1);
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_unknown_criteria_is_fatal() {
        let wire = api::RuleSet {
            rules: vec![api::Rule {
                criteria: "greater than".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = RuleSetTranslator::decode(&wire, &Meta::default()).unwrap_err();
        assert!(matches!(err, Error::Translation(_)));
        assert!(logs_contain("PROVIDER BUG: rule has unknown criteria"));
    }
}
