use super::{Seconds, Tags, Violation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// ContactGroup is a set of people and integrations which are notified
/// together, with per-severity reminders and escalations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContactGroup {
    #[serde(default)]
    pub aggregation_window: Option<Seconds>,
    #[serde(default)]
    pub alert_option: Vec<AlertOption>,
    #[serde(default)]
    pub email: Vec<EmailContact>,
    #[serde(default)]
    pub http: Vec<HttpContact>,
    #[serde(default)]
    pub irc: Vec<IrcContact>,
    #[serde(default)]
    pub long_message: Option<String>,
    #[serde(default)]
    pub long_subject: Option<String>,
    #[serde(default)]
    pub long_summary: Option<String>,
    pub name: String,
    #[serde(default)]
    pub pager_duty: Vec<PagerDutyContact>,
    #[serde(default)]
    pub short_message: Option<String>,
    #[serde(default)]
    pub short_summary: Option<String>,
    #[serde(default)]
    pub slack: Vec<SlackContact>,
    #[serde(default)]
    pub sms: Vec<SmsContact>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub victorops: Vec<VictorOpsContact>,
    #[serde(default)]
    pub xmpp: Vec<XmppContact>,

    // Computed.
    #[serde(default)]
    pub last_modified: Option<u64>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
}

/// AlertOption configures reminders and escalation for one severity.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AlertOption {
    pub escalate_after: Option<Seconds>,
    pub escalate_to: Option<String>,
    pub reminder: Option<Seconds>,
    pub severity: u8,
}

/// Email contacts are either a platform user, or a bare address.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EmailContact {
    pub address: Option<String>,
    pub user: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HttpContact {
    pub address: String,
    pub format: Option<String>,
    pub method: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct IrcContact {
    pub user: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PagerDutyContact {
    pub contact_group_fallback: Option<String>,
    pub service_key: String,
    pub webhook_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SlackContact {
    pub buttons: bool,
    pub channel: String,
    pub contact_group_fallback: Option<String>,
    pub team: String,
    pub username: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SmsContact {
    pub address: Option<String>,
    pub user: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VictorOpsContact {
    pub api_key: String,
    pub contact_group_fallback: Option<String>,
    pub critical: u8,
    pub info: u8,
    pub team: String,
    pub warning: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct XmppContact {
    pub address: Option<String>,
    pub user: Option<String>,
}

impl ContactGroup {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        let mut severities = BTreeSet::new();
        for (i, opt) in self.alert_option.iter().enumerate() {
            if !severities.insert(opt.severity) {
                out.push(Violation::new(
                    format!("alert_option.{i}.severity"),
                    format!("severity {} is configured more than once", opt.severity),
                ));
            }
            if opt.escalate_after.is_some() != opt.escalate_to.is_some() {
                out.push(Violation::new(
                    format!("alert_option.{i}"),
                    "escalate_after and escalate_to must be set together",
                ));
            }
        }

        let user_or_address = [
            ("email", self.email.iter().map(|c| (&c.user, &c.address)).collect::<Vec<_>>()),
            ("sms", self.sms.iter().map(|c| (&c.user, &c.address)).collect()),
            ("xmpp", self.xmpp.iter().map(|c| (&c.user, &c.address)).collect()),
        ];
        for (attr, contacts) in user_or_address {
            for (i, (user, address)) in contacts.into_iter().enumerate() {
                if user.is_some() == address.is_some() {
                    out.push(Violation::new(
                        format!("{attr}.{i}"),
                        "exactly one of user or address must be set",
                    ));
                }
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
    fn test_contact_group_validation() {
        let group: ContactGroup = serde_json::from_value(json!({
            "name": "ops",
            "alert_option": [
                {"severity": 1, "reminder": "5m", "escalate_after": "1h", "escalate_to": "/contact_group/2"},
                {"severity": 1},
                {"severity": 2, "escalate_after": "1h"},
            ],
            "email": [{"address": "ops@example.com"}, {}],
            "sms": [{"user": "/user/1", "address": "+15555550100"}],
        }))
        .unwrap();

        let paths: Vec<_> = group.validate().into_iter().map(|v| v.path).collect();
        assert_eq!(
            paths,
            vec!["alert_option.1.severity", "alert_option.2", "email.1", "sms.0"]
        );
    }
}
