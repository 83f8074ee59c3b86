use super::{Seconds, Tags, Violation, MAX_SEVERITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// RuleSet is a metric-scoped list of predicates which notify contact
/// groups at a severity when they fire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// CID of the check (not the check bundle) whose metric is evaluated.
    pub check: String,
    #[serde(rename = "if", default)]
    pub rules: Vec<RuleIf>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub metric_filter: Option<String>,
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default)]
    pub metric_pattern: Option<String>,
    #[serde(default)]
    pub metric_type: RuleMetricType,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleMetricType {
    #[default]
    Numeric,
    Text,
}

impl RuleMetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleMetricType::Numeric => "numeric",
            RuleMetricType::Text => "text",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RuleIf {
    #[serde(default)]
    pub then: RuleThen,
    pub value: RuleValue,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RuleThen {
    /// Delay before notifying. Carried as whole minutes on the wire.
    pub after: Option<Seconds>,
    /// Contact group CIDs to notify.
    pub notify: BTreeSet<String>,
    /// Severity raised when the rule matches. Zero clears the alert.
    pub severity: u8,
}

impl Default for RuleThen {
    fn default() -> Self {
        Self {
            after: None,
            notify: BTreeSet::new(),
            severity: crate::MIN_SEVERITY,
        }
    }
}

/// RuleValue holds exactly one predicate, optionally windowed by `over`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RuleValue {
    pub absent: Option<Seconds>,
    pub changed: Option<String>,
    pub contains: Option<String>,
    #[serde(rename = "match")]
    pub match_: Option<String>,
    pub max_value: Option<String>,
    pub min_value: Option<String>,
    pub not_contain: Option<String>,
    pub not_match: Option<String>,
    pub over: Option<RuleOver>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RuleOver {
    /// Minimum duration of data which must be present.
    #[serde(default)]
    pub atleast: Option<Seconds>,
    /// Duration of the window.
    pub last: Seconds,
    pub using: WindowFunction,
}

/// WindowFunction aggregates a metric over a window before the predicate
/// is applied.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowFunction {
    Average,
    Counter,
    #[serde(rename = "counter_2")]
    Counter2,
    #[serde(rename = "counter_2_stddev")]
    Counter2Stddev,
    CounterStddev,
    Derive,
    #[serde(rename = "derive_2")]
    Derive2,
    #[serde(rename = "derive_2_stddev")]
    Derive2Stddev,
    DeriveStddev,
    Stddev,
}

impl WindowFunction {
    pub const ALL: &'static [&'static str] = &[
        "average",
        "counter",
        "counter_2",
        "counter_2_stddev",
        "counter_stddev",
        "derive",
        "derive_2",
        "derive_2_stddev",
        "derive_stddev",
        "stddev",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowFunction::Average => "average",
            WindowFunction::Counter => "counter",
            WindowFunction::Counter2 => "counter_2",
            WindowFunction::Counter2Stddev => "counter_2_stddev",
            WindowFunction::CounterStddev => "counter_stddev",
            WindowFunction::Derive => "derive",
            WindowFunction::Derive2 => "derive_2",
            WindowFunction::Derive2Stddev => "derive_2_stddev",
            WindowFunction::DeriveStddev => "derive_stddev",
            WindowFunction::Stddev => "stddev",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }
}

/// Criteria is the fixed vocabulary of rule predicates understood by the
/// platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criteria {
    OnAbsence,
    OnChange,
    Contains,
    Match,
    NotContain,
    NotMatch,
    MinValue,
    MaxValue,
}

impl Criteria {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Criteria::OnAbsence => "on absence",
            Criteria::OnChange => "on change",
            Criteria::Contains => "contains",
            Criteria::Match => "match",
            Criteria::NotContain => "does not contain",
            Criteria::NotMatch => "does not match",
            Criteria::MinValue => "min value",
            Criteria::MaxValue => "max value",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        Some(match s {
            "on absence" => Criteria::OnAbsence,
            "on change" => Criteria::OnChange,
            "contains" => Criteria::Contains,
            "match" => Criteria::Match,
            "does not contain" => Criteria::NotContain,
            "does not match" => Criteria::NotMatch,
            "min value" => Criteria::MinValue,
            "max value" => Criteria::MaxValue,
            _ => return None,
        })
    }

    /// Attribute of the `value` block which configures this criteria.
    pub fn attribute(&self) -> &'static str {
        match self {
            Criteria::OnAbsence => "absent",
            Criteria::OnChange => "changed",
            Criteria::Contains => "contains",
            Criteria::Match => "match",
            Criteria::NotContain => "not_contain",
            Criteria::NotMatch => "not_match",
            Criteria::MinValue => "min_value",
            Criteria::MaxValue => "max_value",
        }
    }

    /// Returns false if the criteria cannot be applied to a metric of type `t`.
    pub fn accepts(&self, t: RuleMetricType) -> bool {
        match self {
            Criteria::OnAbsence | Criteria::OnChange => true,
            Criteria::Contains | Criteria::Match | Criteria::NotContain | Criteria::NotMatch => {
                t == RuleMetricType::Text
            }
            Criteria::MinValue | Criteria::MaxValue => t == RuleMetricType::Numeric,
        }
    }
}

impl RuleValue {
    /// Populated predicates of this value, as criteria and configured value.
    pub fn predicates(&self) -> Vec<(Criteria, String)> {
        let RuleValue {
            absent,
            changed,
            contains,
            match_,
            max_value,
            min_value,
            not_contain,
            not_match,
            over: _,
        } = self;

        let mut out = Vec::new();
        if let Some(v) = absent {
            out.push((Criteria::OnAbsence, v.to_string()));
        }
        if let Some(v) = changed {
            out.push((Criteria::OnChange, v.clone()));
        }
        for (criteria, value) in [
            (Criteria::Contains, contains),
            (Criteria::Match, match_),
            (Criteria::MaxValue, max_value),
            (Criteria::MinValue, min_value),
            (Criteria::NotContain, not_contain),
            (Criteria::NotMatch, not_match),
        ] {
            if let Some(v) = value {
                out.push((criteria, v.clone()));
            }
        }
        out
    }

    /// The single populated predicate, or a Violation.
    pub fn predicate(&self) -> Result<(Criteria, String), Violation> {
        let mut predicates = self.predicates();

        match (predicates.pop(), predicates.is_empty()) {
            (Some(predicate), true) => Ok(predicate),
            (last, _) => {
                let names: Vec<_> = predicates
                    .iter()
                    .chain(last.iter())
                    .map(|(c, _)| c.attribute())
                    .collect();
                Err(Violation::new(
                    "value",
                    format!("exactly one predicate must be set, found {names:?}"),
                ))
            }
        }
    }

    /// Build a value holding the single predicate `criteria`.
    pub fn from_predicate(criteria: Criteria, value: String) -> Self {
        let mut out = Self::default();
        match criteria {
            Criteria::OnAbsence => out.absent = Seconds::parse(&value).ok(),
            Criteria::OnChange => out.changed = Some(value),
            Criteria::Contains => out.contains = Some(value),
            Criteria::Match => out.match_ = Some(value),
            Criteria::NotContain => out.not_contain = Some(value),
            Criteria::NotMatch => out.not_match = Some(value),
            Criteria::MinValue => out.min_value = Some(value),
            Criteria::MaxValue => out.max_value = Some(value),
        }
        out
    }
}

impl RuleSet {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        match (&self.metric_name, &self.metric_pattern) {
            (Some(_), Some(_)) | (None, None) => out.push(Violation::new(
                "metric_name",
                "exactly one of metric_name or metric_pattern must be set",
            )),
            _ => (),
        }
        if self.metric_filter.is_some() && self.metric_pattern.is_none() {
            out.push(Violation::new(
                "metric_filter",
                "metric_filter may only be set alongside metric_pattern",
            ));
        }

        for (index, rule) in self.rules.iter().enumerate() {
            let prefix = format!("if.{index}");

            match rule.value.predicate() {
                Err(violation) => out.push(Violation::new(
                    format!("{prefix}.{}", violation.path),
                    violation.rule,
                )),
                Ok((criteria, value)) => {
                    if !criteria.accepts(self.metric_type) {
                        out.push(Violation::new(
                            format!("{prefix}.value.{}", criteria.attribute()),
                            format!(
                                "criteria {:?} is not compatible with metric_type {:?}",
                                criteria.as_wire(),
                                self.metric_type.as_str()
                            ),
                        ));
                    }
                    if criteria == Criteria::OnChange && value != "true" {
                        out.push(Violation::new(
                            format!("{prefix}.value.changed"),
                            "changed may only be \"true\"",
                        ));
                    }
                    if matches!(criteria, Criteria::MinValue | Criteria::MaxValue)
                        && value.trim().parse::<f64>().is_err()
                    {
                        out.push(Violation::new(
                            format!("{prefix}.value.{}", criteria.attribute()),
                            format!("{value:?} is not a number"),
                        ));
                    }
                }
            }

            if let Some(over) = &rule.value.over {
                if over.last.is_zero() {
                    out.push(Violation::new(
                        format!("{prefix}.value.over.last"),
                        "window duration must be greater than zero",
                    ));
                }
                if let Some(atleast) = over.atleast {
                    if atleast > over.last {
                        out.push(Violation::new(
                            format!("{prefix}.value.over.atleast"),
                            format!(
                                "minimum duration {atleast}s exceeds window duration {}s",
                                over.last
                            ),
                        ));
                    }
                }
            }
            if rule.then.severity > MAX_SEVERITY {
                out.push(Violation::new(
                    format!("{prefix}.then.severity"),
                    format!("severity must be between 0 and {MAX_SEVERITY}"),
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn rule_set(metric_type: &str, value: serde_json::Value) -> RuleSet {
        serde_json::from_value(json!({
            "check": "/check/1",
            "metric_name": "rtt",
            "metric_type": metric_type,
            "if": [{"value": value, "then": {"severity": 1}}],
        }))
        .unwrap()
    }

    #[test]
    fn test_criteria_round_trip() {
        for criteria in [
            Criteria::OnAbsence,
            Criteria::OnChange,
            Criteria::Contains,
            Criteria::Match,
            Criteria::NotContain,
            Criteria::NotMatch,
            Criteria::MinValue,
            Criteria::MaxValue,
        ] {
            assert_eq!(Criteria::from_wire(criteria.as_wire()), Some(criteria));
        }
        assert_eq!(Criteria::from_wire("greater than"), None);
    }

    #[test]
    fn test_metric_type_compatibility() {
        assert!(rule_set("text", json!({"contains": "err"})).validate().is_empty());
        assert!(rule_set("numeric", json!({"max_value": "10"})).validate().is_empty());
        assert!(rule_set("numeric", json!({"absent": "70"})).validate().is_empty());

        let out = rule_set("numeric", json!({"match": "err"})).validate();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, "if.0.value.match");

        let out = rule_set("text", json!({"min_value": "1"})).validate();
        assert_eq!(out[0].path, "if.0.value.min_value");
    }

    #[test]
    fn test_predicates_are_exclusive() {
        let out = rule_set("numeric", json!({"min_value": "1", "max_value": "2"})).validate();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, "if.0.value");

        let out = rule_set("numeric", json!({})).validate();
        assert_eq!(out[0].path, "if.0.value");
    }

    #[test]
    fn test_windowing() {
        let ok = rule_set(
            "numeric",
            json!({"max_value": "5", "over": {"last": "5m", "atleast": "1m", "using": "average"}}),
        );
        assert!(ok.validate().is_empty());

        let bad = rule_set(
            "numeric",
            json!({"max_value": "5", "over": {"last": "1m", "atleast": "5m", "using": "derive_2"}}),
        );
        assert_eq!(bad.validate()[0].path, "if.0.value.over.atleast");

        let zero = rule_set(
            "numeric",
            json!({"max_value": "5", "over": {"last": 0, "using": "stddev"}}),
        );
        assert_eq!(zero.validate()[0].path, "if.0.value.over.last");
    }

    #[test]
    fn test_metric_name_xor_pattern() {
        let mut set = rule_set("numeric", json!({"absent": "60"}));
        set.metric_pattern = Some("cpu.*".to_string());
        assert_eq!(set.validate()[0].path, "metric_name");

        set.metric_name = None;
        set.metric_filter = Some("tag:env:prod".to_string());
        assert!(set.validate().is_empty());

        set.metric_pattern = None;
        set.metric_name = Some("cpu".to_string());
        assert_eq!(set.validate()[0].path, "metric_filter");
    }

    #[test]
    fn test_window_function_names() {
        for name in WindowFunction::ALL {
            assert_eq!(WindowFunction::parse(name).unwrap().as_str(), *name);
        }
    }
}
