use crate::{
    error::fault,
    hashing::{sum, Field},
    tags, Error, Meta, Translator,
};
use api::{
    Contacts, Escalation, ExternalContact, HttpContactInfo, PagerDutyContactInfo,
    SlackContactInfo, UserContact, VictorOpsContactInfo,
};
use models::{
    ids::{contact_group_cid, contact_group_id, Entity},
    AlertOption, ContactGroup, EmailContact, HttpContact, IrcContact, PagerDutyContact, Seconds,
    SlackContact, SmsContact, VictorOpsContact, Violation, XmppContact, MAX_SEVERITY, MIN_SEVERITY,
};
use schema::{descriptions, Attribute, Kind, Schema, Validator};
use serde::{de::DeserializeOwned, Serialize};

pub struct ContactGroupTranslator;

const DEFAULT_AGGREGATION_WINDOW: &str = "300";

// Contact methods on the wire.
const EMAIL: &str = "email";
const HTTP: &str = "http";
const IRC: &str = "irc";
const PAGER_DUTY: &str = "pagerduty";
const SLACK: &str = "slack";
const SMS: &str = "sms";
const VICTOROPS: &str = "victorops";
const XMPP: &str = "xmpp";

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("aggregation_window", "Alerts raised within this window are sent together"),
    ("alert_option", "Reminders and escalation of one severity"),
    ("alert_option.escalate_after", "Delay before an unresolved alert escalates"),
    ("alert_option.escalate_to", "Contact group which escalated alerts are sent to"),
    ("alert_option.reminder", "Interval between reminders of an unresolved alert"),
    ("alert_option.severity", "Severity the options apply to"),
    ("email", "Email contacts"),
    ("email.address", "Email address"),
    ("email.user", "User whose email address is used"),
    ("http", "HTTP endpoints which receive alerts"),
    ("http.address", "URL of the endpoint"),
    ("http.format", "Encoding of the alert"),
    ("http.method", "HTTP method of the request"),
    ("irc", "IRC contacts"),
    ("irc.user", "User whose IRC nickname is used"),
    ("last_modified", "Time of the last modification, in epoch seconds"),
    ("last_modified_by", "User who last modified the group"),
    ("long_message", "Template of the long alert message"),
    ("long_subject", "Template of the long alert subject"),
    ("long_summary", "Template of the long alert summary"),
    ("name", "Name of the contact group"),
    ("pager_duty", "PagerDuty integrations"),
    ("pager_duty.contact_group_fallback", "Contact group notified if PagerDuty is unreachable"),
    ("pager_duty.service_key", "PagerDuty integration key"),
    ("pager_duty.webhook_url", "PagerDuty webhook URL"),
    ("short_message", "Template of the short alert message"),
    ("short_summary", "Template of the short alert summary"),
    ("slack", "Slack integrations"),
    ("slack.buttons", "Include acknowledgement buttons"),
    ("slack.channel", "Slack channel of alerts"),
    ("slack.contact_group_fallback", "Contact group notified if Slack is unreachable"),
    ("slack.team", "Slack team ID"),
    ("slack.username", "Username alerts are posted as"),
    ("sms", "SMS contacts"),
    ("sms.address", "Phone number"),
    ("sms.user", "User whose phone number is used"),
    ("tags", "Tags of the contact group"),
    ("victorops", "VictorOps integrations"),
    ("victorops.api_key", "VictorOps API key"),
    ("victorops.contact_group_fallback", "Contact group notified if VictorOps is unreachable"),
    ("victorops.critical", "Highest severity which maps to a critical incident"),
    ("victorops.info", "Highest severity which maps to an informational incident"),
    ("victorops.team", "VictorOps team"),
    ("victorops.warning", "Highest severity which maps to a warning incident"),
    ("xmpp", "XMPP contacts"),
    ("xmpp.address", "XMPP address"),
    ("xmpp.user", "User whose XMPP address is used"),
];

const ALERT_OPTION_FIELDS: &[Field] = &[
    Field::Str("escalate_after"),
    Field::Str("escalate_to"),
    Field::Str("reminder"),
    Field::Int("severity"),
];
const USER_OR_ADDRESS_FIELDS: &[Field] = &[Field::Str("address"), Field::Str("user")];
const HTTP_FIELDS: &[Field] = &[Field::Str("address"), Field::Str("format"), Field::Str("method")];
const IRC_FIELDS: &[Field] = &[Field::Str("user")];
const PAGER_DUTY_FIELDS: &[Field] = &[
    Field::Str("contact_group_fallback"),
    Field::Str("service_key"),
    Field::Str("webhook_url"),
];
const SLACK_FIELDS: &[Field] = &[
    Field::Bool("buttons"),
    Field::Str("channel"),
    Field::Str("contact_group_fallback"),
    Field::Str("team"),
    Field::Str("username"),
];
const VICTOROPS_FIELDS: &[Field] = &[
    Field::Str("api_key"),
    Field::Str("contact_group_fallback"),
    Field::Int("critical"),
    Field::Int("info"),
    Field::Str("team"),
    Field::Int("warning"),
];

fn severity() -> Attribute {
    Attribute::int().required().validate(Validator::IntRange {
        min: MIN_SEVERITY as i64,
        max: MAX_SEVERITY as i64,
    })
}

fn contact_group() -> Attribute {
    Attribute::string().validate(Validator::Cid(Entity::ContactGroup))
}

fn user_or_address() -> Schema {
    Schema::new()
        .attr("address", Attribute::string())
        .attr("user", Attribute::string().validate(Validator::Cid(Entity::User)))
}

/// Set of `schema` blocks, hashed over `fields`.
fn blocks(schema: Schema, hash: schema::SetHash) -> Attribute {
    Attribute::set(Kind::Block(schema)).hash_with(hash)
}

impl Translator for ContactGroupTranslator {
    const NAME: &'static str = "circonus_contact_group";

    type Model = ContactGroup;
    type Wire = api::ContactGroup;

    fn schema() -> Schema {
        let alert_option = Schema::new()
            .attr("escalate_after", Attribute::duration())
            .attr("escalate_to", contact_group())
            .attr("reminder", Attribute::duration())
            .attr("severity", severity());
        let http = Schema::new()
            .attr(
                "address",
                Attribute::string()
                    .required()
                    .validate(Validator::Url { schemes: &["http", "https"] }),
            )
            .attr(
                "format",
                Attribute::string()
                    .default("json")
                    .validate(Validator::OneOf(&["json", "params"])),
            )
            .attr(
                "method",
                Attribute::string()
                    .default("POST")
                    .validate(Validator::OneOf(&["GET", "POST"])),
            );
        let irc = Schema::new().attr(
            "user",
            Attribute::string().required().validate(Validator::Cid(Entity::User)),
        );
        let pager_duty = Schema::new()
            .attr("contact_group_fallback", contact_group())
            .attr("service_key", Attribute::string().required().sensitive())
            .attr(
                "webhook_url",
                Attribute::string()
                    .required()
                    .validate(Validator::Url { schemes: &["http", "https"] }),
            );
        let slack = Schema::new()
            .attr("buttons", Attribute::bool().default(true))
            .attr("channel", Attribute::string().required())
            .attr("contact_group_fallback", contact_group())
            .attr("team", Attribute::string().required())
            .attr("username", Attribute::string().default("Circonus"));
        let victorops = Schema::new()
            .attr("api_key", Attribute::string().required().sensitive())
            .attr("contact_group_fallback", contact_group())
            .attr("critical", severity())
            .attr("info", severity())
            .attr("team", Attribute::string().required())
            .attr("warning", severity());

        let mut schema = Schema::new()
            .attr(
                "aggregation_window",
                Attribute::duration().default(DEFAULT_AGGREGATION_WINDOW),
            )
            .attr("alert_option", blocks(alert_option, |v| sum(v, ALERT_OPTION_FIELDS)))
            .attr("email", blocks(user_or_address(), |v| sum(v, USER_OR_ADDRESS_FIELDS)))
            .attr("http", blocks(http, |v| sum(v, HTTP_FIELDS)))
            .attr("irc", blocks(irc, |v| sum(v, IRC_FIELDS)))
            .attr("last_modified", Attribute::int().computed())
            .attr("last_modified_by", Attribute::string().computed())
            .attr("long_message", Attribute::string())
            .attr("long_subject", Attribute::string())
            .attr("long_summary", Attribute::string())
            .attr("name", Attribute::string().required())
            .attr("pager_duty", blocks(pager_duty, |v| sum(v, PAGER_DUTY_FIELDS)))
            .attr("short_message", Attribute::string())
            .attr("short_summary", Attribute::string())
            .attr("slack", blocks(slack, |v| sum(v, SLACK_FIELDS)))
            .attr("sms", blocks(user_or_address(), |v| sum(v, USER_OR_ADDRESS_FIELDS)))
            .attr("tags", tags::attribute())
            .attr("victorops", blocks(victorops, |v| sum(v, VICTOROPS_FIELDS)))
            .attr("xmpp", blocks(user_or_address(), |v| sum(v, USER_OR_ADDRESS_FIELDS)));

        descriptions::fuse(Self::NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn validate(group: &ContactGroup) -> Vec<Violation> {
        group.validate()
    }

    fn encode(group: &ContactGroup, meta: &Meta) -> Result<api::ContactGroup, Error> {
        let mut reminders = [0u64; 5];
        let mut escalations: [Option<Escalation>; 5] = Default::default();

        for (i, opt) in group.alert_option.iter().enumerate() {
            let slot = usize::from(opt.severity.clamp(MIN_SEVERITY, MAX_SEVERITY) - 1);

            reminders[slot] = opt.reminder.map(|r| r.as_secs()).unwrap_or_default();
            escalations[slot] = match (&opt.escalate_after, &opt.escalate_to) {
                (Some(after), Some(to)) => Some(Escalation {
                    after: after.as_secs(),
                    contact_group: to.clone(),
                }),
                (None, None) => None,
                _ => {
                    return Err(Error::Validation {
                        path: format!("alert_option.{i}"),
                        rule: "escalate_after and escalate_to must be set together".to_string(),
                    })
                }
            };
        }

        Ok(api::ContactGroup {
            cid: None,
            last_modified: None,
            last_modified_by: None,
            aggregation_window: group
                .aggregation_window
                .map(|w| w.as_secs())
                .unwrap_or_default(),
            alert_formats: api::AlertFormats {
                long_message: group.long_message.clone(),
                long_subject: group.long_subject.clone(),
                long_summary: group.long_summary.clone(),
                short_message: group.short_message.clone(),
                short_summary: group.short_summary.clone(),
            },
            contacts: encode_contacts(group)?,
            escalations,
            name: group.name.clone(),
            reminders,
            tags: tags::encode(&group.tags, meta),
        })
    }

    fn decode(wire: &api::ContactGroup, meta: &Meta) -> Result<ContactGroup, Error> {
        let mut group = ContactGroup {
            aggregation_window: Some(Seconds::new(wire.aggregation_window)),
            alert_option: Vec::new(),
            email: Vec::new(),
            http: Vec::new(),
            irc: Vec::new(),
            long_message: wire.alert_formats.long_message.clone(),
            long_subject: wire.alert_formats.long_subject.clone(),
            long_summary: wire.alert_formats.long_summary.clone(),
            name: wire.name.clone(),
            pager_duty: Vec::new(),
            short_message: wire.alert_formats.short_message.clone(),
            short_summary: wire.alert_formats.short_summary.clone(),
            slack: Vec::new(),
            sms: Vec::new(),
            tags: tags::decode(&wire.tags, meta),
            victorops: Vec::new(),
            xmpp: Vec::new(),
            last_modified: wire.last_modified,
            last_modified_by: wire.last_modified_by.clone(),
        };

        for (slot, (reminder, escalation)) in
            wire.reminders.iter().zip(wire.escalations.iter()).enumerate()
        {
            if *reminder == 0 && escalation.is_none() {
                continue;
            }
            group.alert_option.push(AlertOption {
                escalate_after: escalation.as_ref().map(|e| Seconds::new(e.after)),
                escalate_to: escalation.as_ref().map(|e| e.contact_group.clone()),
                reminder: (*reminder != 0).then(|| Seconds::new(*reminder)),
                severity: slot as u8 + MIN_SEVERITY,
            });
        }

        for user in &wire.contacts.users {
            let contact = Some(user.user.clone());
            match user.method.as_str() {
                EMAIL => group.email.push(EmailContact { user: contact, address: None }),
                SMS => group.sms.push(SmsContact { user: contact, address: None }),
                XMPP => group.xmpp.push(XmppContact { user: contact, address: None }),
                IRC => group.irc.push(IrcContact { user: user.user.clone() }),
                other => fault(format_args!("contact group has user contact method {other:?}")),
            }
        }
        for external in &wire.contacts.external {
            decode_external(external, &mut group)?;
        }
        Ok(group)
    }
}

fn encode_contacts(group: &ContactGroup) -> Result<Contacts, Error> {
    let mut contacts = Contacts::default();

    let user_or_address = group
        .email
        .iter()
        .map(|c| (EMAIL, &c.user, &c.address))
        .chain(group.sms.iter().map(|c| (SMS, &c.user, &c.address)))
        .chain(group.xmpp.iter().map(|c| (XMPP, &c.user, &c.address)));

    for (method, user, address) in user_or_address {
        if let Some(user) = user {
            contacts.users.push(UserContact {
                contact_info: None,
                method: method.to_string(),
                user: user.clone(),
            });
        } else if let Some(address) = address {
            contacts.external.push(ExternalContact {
                contact_info: address.clone(),
                method: method.to_string(),
            });
        }
    }
    for irc in &group.irc {
        contacts.users.push(UserContact {
            contact_info: None,
            method: IRC.to_string(),
            user: irc.user.clone(),
        });
    }

    for (i, http) in group.http.iter().enumerate() {
        let info = HttpContactInfo {
            method: http.method.clone().unwrap_or_else(|| "POST".to_string()),
            params: http.format.clone().unwrap_or_else(|| "json".to_string()),
            url: http.address.clone(),
        };
        contacts.external.push(external(HTTP, &info, &format!("http.{i}"))?);
    }
    for (i, pd) in group.pager_duty.iter().enumerate() {
        let path = format!("pager_duty.{i}");
        let info = PagerDutyContactInfo {
            fallback: fallback(&pd.contact_group_fallback, &path)?,
            integration_key: pd.service_key.clone(),
            webhook_url: pd.webhook_url.clone(),
        };
        contacts.external.push(external(PAGER_DUTY, &info, &path)?);
    }
    for (i, slack) in group.slack.iter().enumerate() {
        let path = format!("slack.{i}");
        let info = SlackContactInfo {
            buttons: slack.buttons,
            channel: slack.channel.clone(),
            fallback: fallback(&slack.contact_group_fallback, &path)?,
            team: slack.team.clone(),
            username: slack.username.clone(),
        };
        contacts.external.push(external(SLACK, &info, &path)?);
    }
    for (i, vo) in group.victorops.iter().enumerate() {
        let path = format!("victorops.{i}");
        let info = VictorOpsContactInfo {
            api_key: vo.api_key.clone(),
            critical: vo.critical,
            fallback: fallback(&vo.contact_group_fallback, &path)?,
            info: vo.info,
            team: vo.team.clone(),
            warning: vo.warning,
        };
        contacts.external.push(external(VICTOROPS, &info, &path)?);
    }
    Ok(contacts)
}

fn external<T: Serialize>(method: &str, info: &T, path: &str) -> Result<ExternalContact, Error> {
    let contact_info = serde_json::to_string(info)
        .map_err(|err| crate::provider_bug(format!("encoding {path}: {err}")))?;
    Ok(ExternalContact {
        contact_info,
        method: method.to_string(),
    })
}

/// Numeric id of a fallback contact group, which integrations carry
/// in place of its CID.
fn fallback(cid: &Option<String>, path: &str) -> Result<Option<u64>, Error> {
    cid.as_deref()
        .map(contact_group_id)
        .transpose()
        .map_err(|err| Error::Validation {
            path: format!("{path}.contact_group_fallback"),
            rule: err.to_string(),
        })
}

fn decode_external(external: &ExternalContact, group: &mut ContactGroup) -> Result<(), Error> {
    let address = Some(external.contact_info.clone());

    match external.method.as_str() {
        EMAIL => group.email.push(EmailContact { user: None, address }),
        SMS => group.sms.push(SmsContact { user: None, address }),
        XMPP => group.xmpp.push(XmppContact { user: None, address }),
        HTTP => {
            if let Some(info) = contact_info::<HttpContactInfo>(external) {
                group.http.push(HttpContact {
                    address: info.url,
                    format: Some(info.params),
                    method: Some(info.method),
                });
            }
        }
        PAGER_DUTY => {
            if let Some(info) = contact_info::<PagerDutyContactInfo>(external) {
                group.pager_duty.push(PagerDutyContact {
                    contact_group_fallback: info.fallback.map(contact_group_cid),
                    service_key: info.integration_key,
                    webhook_url: info.webhook_url,
                });
            }
        }
        SLACK => {
            if let Some(info) = contact_info::<SlackContactInfo>(external) {
                group.slack.push(SlackContact {
                    buttons: info.buttons,
                    channel: info.channel,
                    contact_group_fallback: info.fallback.map(contact_group_cid),
                    team: info.team,
                    username: info.username,
                });
            }
        }
        VICTOROPS => {
            if let Some(info) = contact_info::<VictorOpsContactInfo>(external) {
                group.victorops.push(VictorOpsContact {
                    api_key: info.api_key,
                    contact_group_fallback: info.fallback.map(contact_group_cid),
                    critical: info.critical,
                    info: info.info,
                    team: info.team,
                    warning: info.warning,
                });
            }
        }
        other => fault(format_args!("contact group has external contact method {other:?}")),
    }
    Ok(())
}

/// Parse the JSON `contact_info` of an integration. Malformed info is a
/// fault, and the contact is skipped.
fn contact_info<T: DeserializeOwned>(external: &ExternalContact) -> Option<T> {
    match serde_json::from_str(&external.contact_info) {
        Ok(info) => Some(info),
        Err(err) => {
            fault(format_args!(
                "contact group has malformed {} contact_info: {err}",
                external.method
            ));
            None
        }
    }
}
