// This crate holds the typed desired-state models of every resource and
// data source, along with the small value types (tags, durations, identifiers)
// which they share. Models are plain data with serde derivations: the
// `schema` crate normalizes a configuration tree into their shape, and the
// provider translates them to and from the platform's wire format.

mod accounts;
pub mod checks;
mod collectors;
mod contact_groups;
mod dashboards;
mod duration;
mod graphs;
pub mod ids;
mod maintenance;
mod metric_clusters;
mod metrics;
mod overlay_sets;
mod rule_set_groups;
mod rule_sets;
mod tags;
mod worksheets;

pub use accounts::{Account, AccountInvite, AccountUsage, AccountUser};
pub use checks::{Check, CheckVariant, Collector, FilterType, MetricDef, MetricFilter, MetricType};
pub use collectors::{CollectorDetail, CollectorInfo};
pub use contact_groups::{
    AlertOption, ContactGroup, EmailContact, HttpContact, IrcContact, PagerDutyContact,
    SlackContact, SmsContact, VictorOpsContact, XmppContact,
};
pub use dashboards::{Dashboard, GridLayout, Widget};
pub use duration::{parse_float_seconds, Seconds};
pub use graphs::{Axis, Graph, GraphAxis, GraphMetric, GraphMetricCluster, GraphStyle};
pub use maintenance::{format_timestamp, parse_timestamp, Maintenance, MaintenanceTarget};
pub use metric_clusters::{ClusterQuery, MetricCluster};
pub use metrics::Metric;
pub use overlay_sets::{Overlay, OverlaySet};
pub use rule_set_groups::{GroupCondition, GroupFormula, GroupNotify, RuleSetGroup};
pub use rule_sets::{
    Criteria, RuleIf, RuleMetricType, RuleOver, RuleSet, RuleThen, RuleValue, WindowFunction,
};
pub use tags::{Tag, Tags, TAG_RE};
pub use worksheets::{SmartQuery, Worksheet};

/// Severities range over 1 (most severe) through 5.
pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 5;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid duration {value:?}: {reason}")]
    Duration { value: String, reason: String },
    #[error("{value:?} is not a valid {entity} identifier")]
    Cid { entity: &'static str, value: String },
    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },
}

/// Violation is a failed validation of an attribute, identified by its
/// dotted path within the resource (`if.0.value.over.last`).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {rule}")]
pub struct Violation {
    pub path: String,
    pub rule: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule: rule.into(),
        }
    }
}

fn default_true() -> bool {
    true
}
