use crate::{Seconds, Violation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// CheckVariant is the type-specific block of a check.
/// Exactly one is configured per check, and its name is the
/// attribute under which it appears.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum CheckVariant {
    #[serde(rename = "caql")]
    Caql(Caql),
    #[serde(rename = "cloudwatch")]
    CloudWatch(CloudWatch),
    #[serde(rename = "consul")]
    Consul(Consul),
    #[serde(rename = "dns")]
    Dns(Dns),
    #[serde(rename = "external")]
    External(External),
    #[serde(rename = "http")]
    Http(Http),
    #[serde(rename = "httptrap")]
    HttpTrap(HttpTrap),
    #[serde(rename = "icmp_ping")]
    IcmpPing(IcmpPing),
    #[serde(rename = "jmx")]
    Jmx(Jmx),
    #[serde(rename = "json")]
    Json(Json),
    #[serde(rename = "memcached")]
    Memcached(Memcached),
    #[serde(rename = "mysql")]
    MySql(MySql),
    #[serde(rename = "ntp")]
    Ntp(Ntp),
    #[serde(rename = "promtext")]
    PromText(PromText),
    #[serde(rename = "redis")]
    Redis(Redis),
    #[serde(rename = "smtp")]
    Smtp(Smtp),
    #[serde(rename = "snmp")]
    Snmp(Snmp),
    #[serde(rename = "ssh2")]
    Ssh2(Ssh2),
    #[serde(rename = "statsd")]
    StatsD(StatsD),
    #[serde(rename = "tcp")]
    Tcp(Tcp),
}

impl CheckVariant {
    /// Names of every variant block, in lexical order.
    pub const NAMES: &'static [&'static str] = &[
        "caql",
        "cloudwatch",
        "consul",
        "dns",
        "external",
        "http",
        "httptrap",
        "icmp_ping",
        "jmx",
        "json",
        "memcached",
        "mysql",
        "ntp",
        "promtext",
        "redis",
        "smtp",
        "snmp",
        "ssh2",
        "statsd",
        "tcp",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CheckVariant::Caql(_) => "caql",
            CheckVariant::CloudWatch(_) => "cloudwatch",
            CheckVariant::Consul(_) => "consul",
            CheckVariant::Dns(_) => "dns",
            CheckVariant::External(_) => "external",
            CheckVariant::Http(_) => "http",
            CheckVariant::HttpTrap(_) => "httptrap",
            CheckVariant::IcmpPing(_) => "icmp_ping",
            CheckVariant::Jmx(_) => "jmx",
            CheckVariant::Json(_) => "json",
            CheckVariant::Memcached(_) => "memcached",
            CheckVariant::MySql(_) => "mysql",
            CheckVariant::Ntp(_) => "ntp",
            CheckVariant::PromText(_) => "promtext",
            CheckVariant::Redis(_) => "redis",
            CheckVariant::Smtp(_) => "smtp",
            CheckVariant::Snmp(_) => "snmp",
            CheckVariant::Ssh2(_) => "ssh2",
            CheckVariant::StatsD(_) => "statsd",
            CheckVariant::Tcp(_) => "tcp",
        }
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        match self {
            CheckVariant::CloudWatch(cw) if cw.metric.is_empty() => {
                out.push(Violation::new(
                    "cloudwatch.metric",
                    "at least one metric is required",
                ));
            }
            CheckVariant::Consul(consul) => {
                let set = [&consul.node, &consul.service, &consul.state]
                    .iter()
                    .filter(|v| v.is_some())
                    .count();
                if set != 1 {
                    out.push(Violation::new(
                        "consul",
                        "exactly one of node, service, or state must be set",
                    ));
                }
            }
            CheckVariant::Jmx(jmx) => {
                let mut seen = BTreeSet::new();
                for prop in &jmx.mbean_properties {
                    if !seen.insert(prop.index) {
                        out.push(Violation::new(
                            "jmx.mbean_properties",
                            format!("index {} is used more than once", prop.index),
                        ));
                    }
                }
            }
            CheckVariant::Snmp(snmp) => {
                let mut seen = BTreeSet::new();
                for oid in &snmp.oid {
                    if !seen.insert(oid.name.as_str()) {
                        out.push(Violation::new(
                            "snmp.oid",
                            format!("oid name {:?} is used more than once", oid.name),
                        ));
                    }
                }
            }
            _ => (),
        }
        out
    }
}

/// CAQL checks evaluate a Circonus Analytics Query Language statement.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Caql {
    pub query: String,
}

/// CloudWatch checks poll AWS CloudWatch metrics.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CloudWatch {
    pub api_key: String,
    pub api_secret: String,
    /// Dimensions of the queried metrics. The misspelling is load-bearing:
    /// it's the attribute name users have always written.
    pub dimmensions: BTreeMap<String, String>,
    pub granularity: Option<u64>,
    pub metric: BTreeSet<String>,
    pub namespace: String,
    pub url: String,
    pub version: Option<String>,
}

/// Consul checks query the health API of a Consul agent.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Consul {
    pub acl_token: Option<String>,
    pub allow_stale: bool,
    pub ca_chain: Option<String>,
    pub certificate_file: Option<String>,
    pub check_name_blacklist: Vec<String>,
    pub ciphers: Option<String>,
    pub dc: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub http_addr: Option<String>,
    pub key_file: Option<String>,
    pub node: Option<String>,
    pub node_blacklist: Vec<String>,
    pub service: Option<String>,
    pub service_blacklist: Vec<String>,
    pub state: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Dns {
    pub ctype: Option<String>,
    pub nameserver: Option<String>,
    pub query: String,
    pub rtype: Option<String>,
}

/// External checks run a command on the collector.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct External {
    pub command: String,
    pub env: BTreeMap<String, String>,
    pub output_extract: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Http {
    pub auth_method: Option<String>,
    pub auth_password: Option<String>,
    pub auth_user: Option<String>,
    pub body_regexp: Option<String>,
    pub ca_chain: Option<String>,
    pub certificate_file: Option<String>,
    pub ciphers: Option<String>,
    pub code: Option<String>,
    pub extract: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub http_version: Option<String>,
    pub key_file: Option<String>,
    pub method: Option<String>,
    pub payload: Option<String>,
    pub read_limit: Option<u64>,
    pub redirects: Option<u64>,
    pub url: String,
}

/// HTTPTrap checks accept metrics pushed to a submission URL.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct HttpTrap {
    pub async_metrics: bool,
    pub secret: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct IcmpPing {
    /// Percentage of packets which must be returned.
    pub availability: Option<f64>,
    pub count: Option<u64>,
    pub interval: Option<Seconds>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Jmx {
    pub host: String,
    pub mbean_domains: Vec<String>,
    pub mbean_properties: Vec<MbeanProperty>,
    pub password: Option<String>,
    pub port: Option<u64>,
    pub uri: Option<String>,
    pub username: Option<String>,
}

/// MbeanProperty is an `ObjectName` key property to match.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MbeanProperty {
    pub index: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Json {
    pub auth_method: Option<String>,
    pub auth_password: Option<String>,
    pub auth_user: Option<String>,
    pub ca_chain: Option<String>,
    pub certificate_file: Option<String>,
    pub ciphers: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub http_version: Option<String>,
    pub key_file: Option<String>,
    pub method: Option<String>,
    pub payload: Option<String>,
    pub port: Option<u64>,
    pub read_limit: Option<u64>,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Memcached {
    pub port: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MySql {
    pub dsn: String,
    pub query: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Ntp {
    pub port: Option<u64>,
    pub use_control: bool,
}

/// PromText checks scrape a Prometheus text-format endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PromText {
    pub port: Option<u64>,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Redis {
    pub command: Option<String>,
    pub db_index: Option<u64>,
    pub password: Option<String>,
    pub port: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Smtp {
    pub ehlo: Option<String>,
    pub from: Option<String>,
    pub payload: Option<String>,
    pub port: Option<u64>,
    pub sasl_auth_id: Option<String>,
    pub sasl_authentication: Option<String>,
    pub sasl_password: Option<String>,
    pub sasl_user: Option<String>,
    pub starttls: bool,
    pub to: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Snmp {
    pub auth_passphrase: Option<String>,
    pub auth_protocol: Option<String>,
    pub community: Option<String>,
    pub context_engine: Option<String>,
    pub context_name: Option<String>,
    pub oid: Vec<SnmpOid>,
    pub port: Option<u64>,
    pub privacy_passphrase: Option<String>,
    pub privacy_protocol: Option<String>,
    pub security_engine: Option<String>,
    pub security_level: Option<String>,
    pub security_name: Option<String>,
    pub separate_queries: bool,
    pub version: Option<String>,
}

/// SnmpOid names an OID to poll, and the metric type of its value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SnmpOid {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Ssh2 {
    pub method_comp_cs: Option<String>,
    pub method_comp_sc: Option<String>,
    pub method_crypt_cs: Option<String>,
    pub method_crypt_sc: Option<String>,
    pub method_hostkey: Option<String>,
    pub method_kex: Option<String>,
    pub method_mac_cs: Option<String>,
    pub method_mac_sc: Option<String>,
    pub port: Option<u64>,
}

/// StatsD checks accept metrics from a source IP.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StatsD {
    pub source_ip: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Tcp {
    pub banner_regexp: Option<String>,
    pub ca_chain: Option<String>,
    pub certificate_file: Option<String>,
    pub ciphers: Option<String>,
    pub host: String,
    pub key_file: Option<String>,
    pub port: u64,
    pub tls: bool,
}
