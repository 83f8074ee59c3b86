use super::{Error, Tags, Violation, MAX_SEVERITY, MIN_SEVERITY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Maintenance suppresses alerts of the given severities for a target,
/// between `start` and `stop`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Maintenance {
    #[serde(flatten)]
    pub target: MaintenanceTarget,
    #[serde(default)]
    pub notes: Option<String>,
    pub severities: BTreeSet<u8>,
    /// RFC-3339 timestamp at which the window opens.
    pub start: String,
    /// RFC-3339 timestamp at which the window closes.
    pub stop: String,
    #[serde(default)]
    pub tags: Tags,
}

/// MaintenanceTarget is the single item a window applies to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceTarget {
    /// CID of an account (`/account/1`).
    Account(String),
    /// CID of a check (`/check/1`).
    Check(String),
    /// CID of a rule set (`/rule_set/1_metric`).
    RuleSet(String),
    /// A host name, matched against check targets.
    Host(String),
}

impl MaintenanceTarget {
    /// Wire `type` of the targeted item.
    pub fn kind(&self) -> &'static str {
        match self {
            MaintenanceTarget::Account(_) => "account",
            MaintenanceTarget::Check(_) => "check",
            MaintenanceTarget::RuleSet(_) => "rule_set",
            MaintenanceTarget::Host(_) => "host",
        }
    }

    pub fn item(&self) -> &str {
        match self {
            MaintenanceTarget::Account(s)
            | MaintenanceTarget::Check(s)
            | MaintenanceTarget::RuleSet(s)
            | MaintenanceTarget::Host(s) => s,
        }
    }

    pub fn from_parts(kind: &str, item: String) -> Option<Self> {
        match kind {
            "account" => Some(MaintenanceTarget::Account(item)),
            "check" => Some(MaintenanceTarget::Check(item)),
            "rule_set" => Some(MaintenanceTarget::RuleSet(item)),
            "host" => Some(MaintenanceTarget::Host(item)),
            _ => None,
        }
    }
}

/// Parse an RFC-3339 timestamp into epoch seconds.
pub fn parse_timestamp(value: &str) -> Result<i64, Error> {
    OffsetDateTime::parse(value.trim(), &Rfc3339)
        .map(|t| t.unix_timestamp())
        .map_err(|err| Error::Timestamp {
            value: value.to_string(),
            reason: err.to_string(),
        })
}

/// Format epoch seconds as an RFC-3339 timestamp in UTC.
pub fn format_timestamp(epoch: i64) -> Result<String, Error> {
    let reason = |err: &dyn std::fmt::Display| Error::Timestamp {
        value: epoch.to_string(),
        reason: err.to_string(),
    };
    OffsetDateTime::from_unix_timestamp(epoch)
        .map_err(|err| reason(&err))?
        .format(&Rfc3339)
        .map_err(|err| reason(&err))
}

impl Maintenance {
    pub fn start_epoch(&self) -> Result<i64, Error> {
        parse_timestamp(&self.start)
    }

    pub fn stop_epoch(&self) -> Result<i64, Error> {
        parse_timestamp(&self.stop)
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        let start = self
            .start_epoch()
            .map_err(|err| out.push(Violation::new("start", err.to_string())))
            .ok();
        let stop = self
            .stop_epoch()
            .map_err(|err| out.push(Violation::new("stop", err.to_string())))
            .ok();

        if let (Some(start), Some(stop)) = (start, stop) {
            if stop <= start {
                out.push(Violation::new("stop", "stop must be after start"));
            }
        }
        if self.severities.is_empty() {
            out.push(Violation::new("severities", "at least one severity is required"));
        }
        for sev in &self.severities {
            if !(MIN_SEVERITY..=MAX_SEVERITY).contains(sev) {
                out.push(Violation::new(
                    "severities",
                    format!("severity {sev} is not within {MIN_SEVERITY}-{MAX_SEVERITY}"),
                ));
            }
        }
        if self.target.item().trim().is_empty() {
            out.push(Violation::new(self.target.kind(), "target must not be empty"));
        }
        out
    }
}
