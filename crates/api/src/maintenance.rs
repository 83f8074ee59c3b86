use crate::Severity;
use serde::{Deserialize, Serialize};

/// Maintenance is a window during which alerts of an item are suppressed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Maintenance {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    /// CID of the item, or a host name.
    pub item: String,
    pub notes: Option<String>,
    pub severities: Vec<Severity>,
    /// Epoch seconds.
    pub start: i64,
    /// Epoch seconds.
    pub stop: i64,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub type_: String,
}

impl crate::Entity for Maintenance {
    const KIND: &'static str = "maintenance";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
