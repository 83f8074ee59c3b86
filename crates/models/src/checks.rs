use super::{Seconds, Tags, Violation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod variants;
pub use variants::CheckVariant;

/// Check is the desired (and observed) state of a check bundle.
///
/// The common half of a check lives here. The variant half is exactly one
/// of the blocks enumerated by [`CheckVariant`], flattened into the same
/// attribute namespace (`dns { ... }`, `http { ... }`, and so on).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Check {
    #[serde(default = "super::default_true")]
    pub active: bool,
    /// Collectors (brokers) which run the check.
    #[serde(default)]
    pub collector: Vec<Collector>,
    #[serde(default)]
    pub metric: Vec<MetricDef>,
    /// Metric filters, evaluated top-to-bottom by the platform.
    #[serde(default)]
    pub metric_filter: Vec<MetricFilter>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub period: Option<Seconds>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub target: Option<String>,
    /// Timeout in fractional seconds.
    #[serde(default)]
    pub timeout: Option<f64>,

    #[serde(flatten)]
    pub variant: CheckVariant,

    // Computed attributes, populated on read.
    #[serde(default)]
    pub check_by_collector: BTreeMap<String, String>,
    #[serde(default)]
    pub check_id: Option<String>,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<u64>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
    #[serde(default)]
    pub reverse_connect_urls: Vec<String>,
    #[serde(default)]
    pub uuids: Vec<String>,
}

impl Check {
    pub fn new(variant: CheckVariant) -> Self {
        Self {
            active: true,
            collector: Vec::new(),
            metric: Vec::new(),
            metric_filter: Vec::new(),
            name: None,
            notes: None,
            period: None,
            tags: Tags::new(),
            target: None,
            timeout: None,
            variant,
            check_by_collector: BTreeMap::new(),
            check_id: None,
            checks: Vec::new(),
            created: None,
            last_modified: None,
            last_modified_by: None,
            reverse_connect_urls: Vec::new(),
            uuids: Vec::new(),
        }
    }

    /// Strip computed attributes, leaving only what a user configures.
    pub fn without_computed(mut self) -> Self {
        self.check_by_collector.clear();
        self.check_id = None;
        self.checks.clear();
        self.created = None;
        self.last_modified = None;
        self.last_modified_by = None;
        self.reverse_connect_urls.clear();
        self.uuids.clear();
        self
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        if let (Some(period), Some(timeout)) = (self.period, self.timeout) {
            if timeout > period.as_secs() as f64 {
                out.push(Violation::new(
                    "timeout",
                    format!("timeout {timeout}s must not exceed period {period}s"),
                ));
            }
        }
        for (index, filter) in self.metric_filter.iter().enumerate() {
            if let Err(err) = regex::Regex::new(&filter.regex) {
                out.push(Violation::new(
                    format!("metric_filter.{index}.regex"),
                    format!("invalid regex: {err}"),
                ));
            }
        }
        out.extend(self.variant.validate());
        out
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Collector {
    /// CID of the broker, such as `/broker/1`.
    pub id: String,
}

/// MetricType is the kind of values a metric stream carries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Caql,
    Composite,
    Histogram,
    Numeric,
    Text,
}

impl MetricType {
    pub const ALL: &'static [&'static str] = &["caql", "composite", "histogram", "numeric", "text"];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Caql => "caql",
            MetricType::Composite => "composite",
            MetricType::Histogram => "histogram",
            MetricType::Numeric => "numeric",
            MetricType::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "caql" => Some(MetricType::Caql),
            "composite" => Some(MetricType::Composite),
            "histogram" => Some(MetricType::Histogram),
            "numeric" => Some(MetricType::Numeric),
            "text" => Some(MetricType::Text),
            _ => None,
        }
    }
}

/// MetricDef is a metric stream collected by a check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetricDef {
    #[serde(default = "super::default_true")]
    pub active: bool,
    pub name: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(rename = "type")]
    pub type_: MetricType,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    Allow,
    Deny,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Allow => "allow",
            FilterType::Deny => "deny",
        }
    }
}

/// MetricFilter allows or denies metrics whose name matches `regex`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetricFilter {
    #[serde(default)]
    pub comment: Option<String>,
    pub regex: String,
    #[serde(rename = "type")]
    pub type_: FilterType,
}
