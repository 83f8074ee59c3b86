use super::{Tags, Violation, MAX_SEVERITY, MIN_SEVERITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// RuleSetGroup composes the outcomes of other rule sets, and may raise
/// the severity of a notification when its formula holds for `wait` minutes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RuleSetGroup {
    #[serde(default)]
    pub condition: Vec<GroupCondition>,
    #[serde(default)]
    pub formula: Option<GroupFormula>,
    pub name: String,
    #[serde(default)]
    pub notify: GroupNotify,
    #[serde(default)]
    pub tags: Tags,
}

/// GroupCondition references a rule set, and the severities of it which match.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupCondition {
    /// 1-based position of the condition within the group.
    pub index: u32,
    #[serde(default)]
    pub matching_severities: BTreeSet<u8>,
    pub rule_set: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupFormula {
    pub expression: String,
    pub raise_severity: u8,
    /// Minutes the expression must hold before severity is raised.
    #[serde(default)]
    pub wait: u32,
}

/// GroupNotify maps each severity to contact groups. Severities which are
/// not configured notify no one.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GroupNotify {
    pub sev1: Vec<String>,
    pub sev2: Vec<String>,
    pub sev3: Vec<String>,
    pub sev4: Vec<String>,
    pub sev5: Vec<String>,
}

impl GroupNotify {
    /// Contact groups of `severity`, which must be in 1..=5.
    pub fn get(&self, severity: u8) -> &[String] {
        match severity {
            1 => &self.sev1,
            2 => &self.sev2,
            3 => &self.sev3,
            4 => &self.sev4,
            5 => &self.sev5,
            _ => &[],
        }
    }

    pub fn get_mut(&mut self, severity: u8) -> Option<&mut Vec<String>> {
        match severity {
            1 => Some(&mut self.sev1),
            2 => Some(&mut self.sev2),
            3 => Some(&mut self.sev3),
            4 => Some(&mut self.sev4),
            5 => Some(&mut self.sev5),
            _ => None,
        }
    }
}

impl RuleSetGroup {
    /// Conditions in ascending order of their index.
    pub fn sorted_conditions(&self) -> Vec<&GroupCondition> {
        let mut out: Vec<_> = self.condition.iter().collect();
        out.sort_by_key(|c| c.index);
        out
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();

        for (i, cond) in self.condition.iter().enumerate() {
            if cond.index < 1 {
                out.push(Violation::new(
                    format!("condition.{i}.index"),
                    "index is 1-based and must be at least 1",
                ));
            } else if !seen.insert(cond.index) {
                out.push(Violation::new(
                    format!("condition.{i}.index"),
                    format!("index {} is used more than once", cond.index),
                ));
            }
            for sev in &cond.matching_severities {
                if !(MIN_SEVERITY..=MAX_SEVERITY).contains(sev) {
                    out.push(Violation::new(
                        format!("condition.{i}.matching_severities"),
                        format!("severity {sev} is not between {MIN_SEVERITY} and {MAX_SEVERITY}"),
                    ));
                }
            }
        }
        if let Some(formula) = &self.formula {
            if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&formula.raise_severity) {
                out.push(Violation::new(
                    "formula.raise_severity",
                    format!("severity must be between {MIN_SEVERITY} and {MAX_SEVERITY}"),
                ));
            }
            if formula.expression.trim().is_empty() {
                out.push(Violation::new("formula.expression", "expression is empty"));
            }
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conditions_sort_by_index() {
        let group: RuleSetGroup = serde_json::from_value(json!({
            "name": "web tier",
            "condition": [
                {"index": 3, "rule_set": "/rule_set/3_c", "matching_severities": [1]},
                {"index": 1, "rule_set": "/rule_set/1_a", "matching_severities": [1]},
                {"index": 2, "rule_set": "/rule_set/2_b", "matching_severities": [2]},
            ],
            "formula": {"expression": "A and B", "raise_severity": 2, "wait": 5},
        }))
        .unwrap();

        assert!(group.validate().is_empty());
        let order: Vec<_> = group.sorted_conditions().iter().map(|c| c.index).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(group.notify.get(4).is_empty());
    }

    #[test]
    fn test_invalid_group() {
        let group: RuleSetGroup = serde_json::from_value(json!({
            "name": "bad",
            "condition": [
                {"index": 0, "rule_set": "/rule_set/1_a"},
                {"index": 2, "rule_set": "/rule_set/2_b", "matching_severities": [9]},
                {"index": 2, "rule_set": "/rule_set/3_c"},
            ],
            "formula": {"expression": " ", "raise_severity": 6},
        }))
        .unwrap();

        let paths: Vec<_> = group.validate().into_iter().map(|v| v.path).collect();
        assert_eq!(
            paths,
            vec![
                "condition.0.index",
                "condition.1.matching_severities",
                "condition.2.index",
                "formula.raise_severity",
                "formula.expression",
            ]
        );
    }
}
