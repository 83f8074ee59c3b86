use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CheckBundle is a check configuration, deployed to one or more brokers.
/// Type-specific settings are flattened into the string-valued `config` map.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CheckBundle {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(rename = "_checks", skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<String>,
    #[serde(rename = "_check_uuids", skip_serializing_if = "Vec::is_empty")]
    pub check_uuids: Vec<String>,
    #[serde(rename = "_created", skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(rename = "_last_modified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<u64>,
    #[serde(rename = "_last_modified_by", skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(rename = "_reverse_connection_urls", skip_serializing_if = "Vec::is_empty")]
    pub reverse_connection_urls: Vec<String>,

    pub brokers: Vec<String>,
    pub config: BTreeMap<String, String>,
    pub display_name: String,
    /// Ordered filter rules, each `[type, regex]` or `[type, regex, comment]`.
    pub metric_filters: Vec<Vec<String>>,
    pub metrics: Vec<BundleMetric>,
    pub notes: Option<String>,
    pub period: u64,
    pub status: String,
    pub tags: Vec<String>,
    pub target: String,
    pub timeout: f64,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct BundleMetric {
    pub name: String,
    pub status: String,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub units: Option<String>,
}

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DISABLED: &str = "disabled";
pub const METRIC_ACTIVE: &str = "active";
pub const METRIC_AVAILABLE: &str = "available";

impl crate::Entity for CheckBundle {
    const KIND: &'static str = "check_bundle";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}

/// Check is a deployment of a bundle onto a single broker.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Check {
    #[serde(rename = "_cid")]
    pub cid: Option<String>,
    #[serde(rename = "_active")]
    pub active: bool,
    #[serde(rename = "_broker")]
    pub broker: String,
    #[serde(rename = "_check_bundle")]
    pub check_bundle: String,
    #[serde(rename = "_check_uuid")]
    pub check_uuid: String,
    #[serde(rename = "_details")]
    pub details: BTreeMap<String, String>,
}

impl crate::Entity for Check {
    const KIND: &'static str = "check";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
