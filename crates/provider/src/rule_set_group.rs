use crate::{error::fault, tags, Error, Meta, Translator};
use api::{RuleSetCondition, Severity};
use models::{
    ids::Entity, GroupCondition, GroupFormula, GroupNotify, RuleSetGroup, Violation, MAX_SEVERITY,
    MIN_SEVERITY,
};
use schema::{descriptions, Attribute, Kind, Schema, Validator};

pub struct RuleSetGroupTranslator;

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("condition", "Rule sets composed by the group"),
    ("condition.index", "1-based position of the condition, which names it in the formula"),
    ("condition.matching_severities", "Severities of the rule set which satisfy the condition"),
    ("condition.rule_set", "CID of the rule set"),
    ("formula", "Expression over the conditions which raises an alert"),
    ("formula.expression", "Boolean expression, or a count of conditions which must hold"),
    ("formula.raise_severity", "Severity of the alert raised"),
    ("formula.wait", "Minutes the expression must hold before alerting"),
    ("name", "Name of the group"),
    ("notify", "Contact groups to notify, by severity"),
    ("notify.sev1", "Contact groups notified of severity 1 alerts"),
    ("notify.sev2", "Contact groups notified of severity 2 alerts"),
    ("notify.sev3", "Contact groups notified of severity 3 alerts"),
    ("notify.sev4", "Contact groups notified of severity 4 alerts"),
    ("notify.sev5", "Contact groups notified of severity 5 alerts"),
    ("tags", "Tags of the group"),
];

fn severity() -> Validator {
    Validator::IntRange {
        min: MIN_SEVERITY as i64,
        max: MAX_SEVERITY as i64,
    }
}

/// Normalize a wire severity, logging a fault if it isn't one.
fn normalize(sev: &Severity, what: &str) -> Option<u8> {
    let out = sev
        .normalize()
        .filter(|s| (MIN_SEVERITY..=MAX_SEVERITY).contains(s));
    if out.is_none() {
        fault(format_args!("rule set group has malformed {what} {sev:?}"));
    }
    out
}

impl Translator for RuleSetGroupTranslator {
    const NAME: &'static str = "circonus_rule_set_group";

    type Model = RuleSetGroup;
    type Wire = api::RuleSetGroup;

    fn schema() -> Schema {
        let condition = Schema::new()
            .attr(
                "index",
                Attribute::int()
                    .required()
                    .validate(Validator::IntRange { min: 1, max: i64::from(u32::MAX) }),
            )
            .attr(
                "matching_severities",
                Attribute::set(Kind::Int).required().min_items(1).validate(severity()),
            )
            .attr(
                "rule_set",
                Attribute::string().required().validate(Validator::Cid(Entity::RuleSet)),
            );
        let formula = Schema::new()
            .attr("expression", Attribute::string().required())
            .attr("raise_severity", Attribute::int().required().validate(severity()))
            .attr(
                "wait",
                Attribute::int()
                    .default(0)
                    .validate(Validator::IntRange { min: 0, max: i64::from(u32::MAX) }),
            );
        let notify = (MIN_SEVERITY..=MAX_SEVERITY).fold(Schema::new(), |schema, sev| {
            schema.attr(
                &format!("sev{sev}"),
                Attribute::list(Kind::String).validate(Validator::Cid(Entity::ContactGroup)),
            )
        });

        let mut schema = Schema::new()
            .attr("condition", Attribute::list(Kind::Block(condition)).required().min_items(1))
            .attr("formula", Attribute::block(formula).required())
            .attr("name", Attribute::string().required())
            .attr("notify", Attribute::block(notify))
            .attr("tags", tags::attribute());

        descriptions::fuse(Self::NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn validate(group: &RuleSetGroup) -> Vec<Violation> {
        group.validate()
    }

    fn encode(group: &RuleSetGroup, meta: &Meta) -> Result<api::RuleSetGroup, Error> {
        let rule_set_conditions = group
            .sorted_conditions()
            .into_iter()
            .map(|cond| RuleSetCondition {
                index: cond.index,
                matching_severities: cond
                    .matching_severities
                    .iter()
                    .map(|sev| Severity::from(*sev))
                    .collect(),
                rule_set: cond.rule_set.clone(),
            })
            .collect();

        // Every severity is sent, so that removed contact groups are cleared.
        let contact_groups = (MIN_SEVERITY..=MAX_SEVERITY)
            .map(|sev| (sev.to_string(), group.notify.get(sev).to_vec()))
            .collect();

        Ok(api::RuleSetGroup {
            cid: None,
            contact_groups,
            formula: group.formula.as_ref().map(|f| api::GroupFormula {
                expression: f.expression.clone(),
                raise_severity: Some(Severity::from(f.raise_severity)),
                wait: u64::from(f.wait),
            }),
            name: group.name.clone(),
            rule_set_conditions,
            tags: tags::encode(&group.tags, meta),
        })
    }

    fn decode(wire: &api::RuleSetGroup, meta: &Meta) -> Result<RuleSetGroup, Error> {
        let mut condition: Vec<GroupCondition> = wire
            .rule_set_conditions
            .iter()
            .enumerate()
            .map(|(position, cond)| GroupCondition {
                // Conditions without an index are numbered by position.
                index: if cond.index == 0 {
                    position as u32 + 1
                } else {
                    cond.index
                },
                matching_severities: cond
                    .matching_severities
                    .iter()
                    .filter_map(|sev| normalize(sev, "matching severity"))
                    .collect(),
                rule_set: cond.rule_set.clone(),
            })
            .collect();
        condition.sort_by_key(|c| c.index);

        let formula = wire.formula.as_ref().map(|f| GroupFormula {
            expression: f.expression.clone(),
            raise_severity: f
                .raise_severity
                .as_ref()
                .and_then(|sev| normalize(sev, "raise_severity"))
                .unwrap_or(MIN_SEVERITY),
            wait: u32::try_from(f.wait).unwrap_or(u32::MAX),
        });

        let mut notify = GroupNotify::default();
        for (sev, groups) in &wire.contact_groups {
            match sev.parse::<u8>().ok().and_then(|s| notify.get_mut(s)) {
                Some(slot) => *slot = groups.clone(),
                None => fault(format_args!("rule set group has contact groups of severity {sev:?}")),
            }
        }

        Ok(RuleSetGroup {
            condition,
            formula,
            name: wire.name.clone(),
            notify,
            tags: tags::decode(&wire.tags, meta),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_polymorphic_severities() {
        let wire: api::RuleSetGroup = serde_json::from_value(json!({
            "_cid": "/rule_set_group/7",
            "name": "web tier",
            "contact_groups": {"1": ["/contact_group/1"], "2": [], "3": [], "4": [], "5": []},
            "formula": {"expression": "A and B", "raise_severity": "2", "wait": 5},
            "rule_set_conditions": [
                {"index": 2, "rule_set": "/rule_set/2_b", "matching_severities": [2.0, "3"]},
                {"index": 1, "rule_set": "/rule_set/1_a", "matching_severities": [1]},
            ],
            "tags": ["team:web"],
        }))
        .unwrap();

        let group = RuleSetGroupTranslator::decode(&wire, &Meta::default()).unwrap();
        assert_eq!(group.condition[0].index, 1);
        assert_eq!(
            group.condition[1].matching_severities,
            [2, 3].into_iter().collect()
        );
        assert_eq!(group.formula.as_ref().unwrap().raise_severity, 2);
        assert_eq!(group.notify.sev1, vec!["/contact_group/1"]);
        assert!(group.notify.sev2.is_empty());

        let encoded = RuleSetGroupTranslator::encode(&group, &Meta::default()).unwrap();
        assert_eq!(encoded.contact_groups.len(), 5);
        assert_eq!(encoded.rule_set_conditions[1].rule_set, "/rule_set/2_b");
    }
}
