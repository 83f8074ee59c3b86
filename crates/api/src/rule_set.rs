use crate::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// RuleSet is an ordered list of alerting rules over a single metric stream
/// (or a pattern of streams) of a check.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RuleSet {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    pub check: String,
    /// Contact group CIDs, keyed by severity ("1" through "5").
    pub contact_groups: BTreeMap<String, Vec<String>>,
    pub filter: Option<String>,
    pub link: Option<String>,
    pub metric_name: Option<String>,
    pub metric_pattern: Option<String>,
    pub metric_type: String,
    pub notes: Option<String>,
    pub parent: Option<String>,
    pub rules: Vec<Rule>,
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Rule {
    pub criteria: String,
    pub severity: Option<Severity>,
    pub value: RuleValue,
    /// Minutes to wait before alerting.
    pub wait: u64,
    /// Seconds of data considered by the window function.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windowing_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windowing_function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windowing_min_duration: Option<u64>,
}

/// RuleValue is the operand of a rule's criteria. Absence is given as a
/// number of seconds; other criteria take a string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RuleValue {
    Int(i64),
    Float(f64),
    String(String),
}

impl Default for RuleValue {
    fn default() -> Self {
        RuleValue::String(String::new())
    }
}

impl std::fmt::Display for RuleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleValue::Int(i) => write!(f, "{i}"),
            RuleValue::Float(v) => write!(f, "{v}"),
            RuleValue::String(s) => f.write_str(s),
        }
    }
}

impl crate::Entity for RuleSet {
    const KIND: &'static str = "rule_set";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
