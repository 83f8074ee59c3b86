use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Dashboard {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(rename = "_created", skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(rename = "_dashboard_uuid", skip_serializing_if = "Option::is_none")]
    pub dashboard_uuid: Option<String>,
    #[serde(rename = "_last_modified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<u64>,

    pub account_default: bool,
    pub grid_layout: GridLayout,
    pub shared: bool,
    pub title: String,
    pub widgets: Vec<Widget>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GridLayout {
    pub height: u32,
    pub width: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Widget {
    pub active: bool,
    pub height: u32,
    pub name: String,
    pub origin: String,
    /// Settings are typed per widget; values are usually strings.
    pub settings: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "type")]
    pub type_: String,
    pub widget_id: String,
    pub width: u32,
}

impl crate::Entity for Dashboard {
    const KIND: &'static str = "dashboard";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
