use lazy_static::lazy_static;
use regex::Regex;

// Platform identifiers (CIDs) are paths of the form `/<entity>/<id>`.
// Most ids are decimal, but graphs and worksheets use UUIDs and rule sets
// are keyed by their check and metric.

lazy_static! {
    pub static ref ACCOUNT_CID_RE: Regex = Regex::new(r"^/account/(\d+|current)$").unwrap();
    pub static ref BROKER_CID_RE: Regex = Regex::new(r"^/broker/\d+$").unwrap();
    pub static ref CHECK_BUNDLE_CID_RE: Regex = Regex::new(r"^/check_bundle/\d+$").unwrap();
    pub static ref CHECK_CID_RE: Regex = Regex::new(r"^/check/\d+$").unwrap();
    pub static ref CONTACT_GROUP_CID_RE: Regex = Regex::new(r"^/contact_group/(\d+)$").unwrap();
    pub static ref DASHBOARD_CID_RE: Regex = Regex::new(r"^/dashboard/\d+$").unwrap();
    pub static ref GRAPH_CID_RE: Regex = Regex::new(r"^/graph/[\w-]+$").unwrap();
    pub static ref MAINTENANCE_CID_RE: Regex = Regex::new(r"^/maintenance/\d+$").unwrap();
    pub static ref METRIC_CLUSTER_CID_RE: Regex = Regex::new(r"^/metric_cluster/\d+$").unwrap();
    pub static ref RULE_SET_CID_RE: Regex = Regex::new(r"^/rule_set/\d+_.+$").unwrap();
    pub static ref RULE_SET_GROUP_CID_RE: Regex = Regex::new(r"^/rule_set_group/\d+$").unwrap();
    pub static ref USER_CID_RE: Regex = Regex::new(r"^/user/\d+$").unwrap();
    pub static ref WORKSHEET_CID_RE: Regex = Regex::new(r"^/worksheet/[\w-]+$").unwrap();
}

/// Entity kinds which carry a platform identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    Broker,
    CheckBundle,
    Check,
    ContactGroup,
    Dashboard,
    Graph,
    Maintenance,
    MetricCluster,
    RuleSet,
    RuleSetGroup,
    User,
    Worksheet,
}

impl Entity {
    pub fn name(&self) -> &'static str {
        match self {
            Entity::Account => "account",
            Entity::Broker => "broker",
            Entity::CheckBundle => "check_bundle",
            Entity::Check => "check",
            Entity::ContactGroup => "contact_group",
            Entity::Dashboard => "dashboard",
            Entity::Graph => "graph",
            Entity::Maintenance => "maintenance",
            Entity::MetricCluster => "metric_cluster",
            Entity::RuleSet => "rule_set",
            Entity::RuleSetGroup => "rule_set_group",
            Entity::User => "user",
            Entity::Worksheet => "worksheet",
        }
    }

    pub fn regex(&self) -> &'static Regex {
        match self {
            Entity::Account => &ACCOUNT_CID_RE,
            Entity::Broker => &BROKER_CID_RE,
            Entity::CheckBundle => &CHECK_BUNDLE_CID_RE,
            Entity::Check => &CHECK_CID_RE,
            Entity::ContactGroup => &CONTACT_GROUP_CID_RE,
            Entity::Dashboard => &DASHBOARD_CID_RE,
            Entity::Graph => &GRAPH_CID_RE,
            Entity::Maintenance => &MAINTENANCE_CID_RE,
            Entity::MetricCluster => &METRIC_CLUSTER_CID_RE,
            Entity::RuleSet => &RULE_SET_CID_RE,
            Entity::RuleSetGroup => &RULE_SET_GROUP_CID_RE,
            Entity::User => &USER_CID_RE,
            Entity::Worksheet => &WORKSHEET_CID_RE,
        }
    }

    /// Validate that `cid` identifies an entity of this kind.
    pub fn validate(&self, cid: &str) -> Result<(), crate::Error> {
        if self.regex().is_match(cid) {
            Ok(())
        } else {
            Err(crate::Error::Cid {
                entity: self.name(),
                value: cid.to_string(),
            })
        }
    }
}

/// Parse the numeric id of a `/contact_group/<id>` CID.
pub fn contact_group_id(cid: &str) -> Result<u64, crate::Error> {
    CONTACT_GROUP_CID_RE
        .captures(cid)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| crate::Error::Cid {
            entity: Entity::ContactGroup.name(),
            value: cid.to_string(),
        })
}

pub fn contact_group_cid(id: u64) -> String {
    format!("/contact_group/{id}")
}

/// Identifiers handed to import may arrive percent-encoded
/// (`%2Fcheck_bundle%2F1`). Decode them, leaving invalid UTF-8 untouched.
pub fn decode_import_id(id: &str) -> String {
    match percent_encoding::percent_decode_str(id).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => id.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cid_regexes() {
        for (entity, case, expect) in [
            (Entity::CheckBundle, "/check_bundle/123", true),
            (Entity::CheckBundle, "/check_bundle/abc", false),
            (Entity::CheckBundle, "check_bundle/1", false),
            (Entity::Account, "/account/current", true),
            (Entity::Account, "/account/42", true),
            (Entity::RuleSet, "/rule_set/1234_cpu`idle", true),
            (Entity::RuleSet, "/rule_set/1234", false),
            (Entity::Graph, "/graph/6d2bc0b4-8e1b-4a7a-9b0e-0a1d8f7c0e11", true),
            (Entity::Worksheet, "/worksheet/6d2bc0b4-8e1b", true),
            (Entity::ContactGroup, "/contact_group/7", true),
            (Entity::User, "/user/", false),
        ] {
            assert_eq!(entity.validate(case).is_ok(), expect, "{case}");
        }
    }

    #[test]
    fn test_contact_group_id() {
        assert_eq!(contact_group_id("/contact_group/4680").unwrap(), 4680);
        contact_group_id("/contact_group/").unwrap_err();
        contact_group_id("4680").unwrap_err();
        assert_eq!(contact_group_cid(4680), "/contact_group/4680");
    }

    #[test]
    fn test_import_id_decoding() {
        assert_eq!(decode_import_id("%2Fcheck_bundle%2F1"), "/check_bundle/1");
        assert_eq!(decode_import_id("/check_bundle/1"), "/check_bundle/1");
        assert_eq!(decode_import_id("%ff"), "%ff");
    }
}
