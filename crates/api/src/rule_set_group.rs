use crate::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// RuleSetGroup alerts on a formula over the states of several rule sets.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RuleSetGroup {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    /// Contact group CIDs, keyed by severity ("1" through "5").
    pub contact_groups: BTreeMap<String, Vec<String>>,
    pub formula: Option<GroupFormula>,
    pub name: String,
    pub rule_set_conditions: Vec<RuleSetCondition>,
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GroupFormula {
    pub expression: String,
    pub raise_severity: Option<Severity>,
    pub wait: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RuleSetCondition {
    pub index: u32,
    pub matching_severities: Vec<Severity>,
    pub rule_set: String,
}

impl crate::Entity for RuleSetGroup {
    const KIND: &'static str = "rule_set_group";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
