use serde::{Deserialize, Serialize};

/// ContactGroup is a set of notification contacts, with per-severity
/// reminders and escalations.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ContactGroup {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(rename = "_last_modified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<u64>,
    #[serde(rename = "_last_modified_by", skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,

    pub aggregation_window: u64,
    pub alert_formats: AlertFormats,
    pub contacts: Contacts,
    /// Escalation of each severity, indexed by severity - 1.
    pub escalations: [Option<Escalation>; 5],
    pub name: String,
    /// Reminder interval (seconds) of each severity, indexed by severity - 1.
    pub reminders: [u64; 5],
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AlertFormats {
    pub long_message: Option<String>,
    pub long_subject: Option<String>,
    pub long_summary: Option<String>,
    pub short_message: Option<String>,
    pub short_summary: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Contacts {
    pub external: Vec<ExternalContact>,
    pub users: Vec<UserContact>,
}

/// ExternalContact is reached directly. `contact_info` is an address for
/// email, sms, and xmpp, and a JSON document for integrations.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ExternalContact {
    pub contact_info: String,
    pub method: String,
}

/// UserContact is reached through the contact details of a platform user.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UserContact {
    #[serde(rename = "_contact_info", skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    pub method: String,
    pub user: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Escalation {
    /// Seconds after which the alert escalates.
    pub after: u64,
    pub contact_group: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HttpContactInfo {
    pub method: String,
    pub params: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PagerDutyContactInfo {
    /// Numeric id of the fallback contact group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<u64>,
    pub integration_key: String,
    pub webhook_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SlackContactInfo {
    pub buttons: bool,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<u64>,
    pub team: String,
    pub username: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VictorOpsContactInfo {
    pub api_key: String,
    pub critical: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<u64>,
    pub info: u8,
    pub team: String,
    pub warning: u8,
}

impl crate::Entity for ContactGroup {
    const KIND: &'static str = "contact_group";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
