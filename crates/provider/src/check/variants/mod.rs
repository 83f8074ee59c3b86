//! Translation of each check variant between its typed configuration block
//! and the flat string map of a check bundle's `config`.
//!
//! Every variant module has the same shape: a `schema` of its block, the
//! `DESCRIPTIONS` of its attributes, a set `hash` of the block, and an
//! `encode` / `decode` pair. Decoders consume the keys they recognize from
//! a [`Swamp`](super::swamp::Swamp).

use super::swamp::Swamp;
use crate::{provider_bug, Error};
use api::CheckBundle;
use models::CheckVariant;
use schema::{Schema, SetHash};
use serde_json::Value;
use std::collections::BTreeMap;

pub mod caql;
pub mod cloudwatch;
pub mod consul;
pub mod dns;
pub mod external;
pub mod http;
pub mod httptrap;
pub mod icmp_ping;
pub mod jmx;
pub mod json;
pub mod memcached;
pub mod mysql;
pub mod ntp;
pub mod promtext;
pub mod redis;
pub mod smtp;
pub mod snmp;
pub mod ssh2;
pub mod statsd;
pub mod tcp;

/// Variant describes the configuration block of one check type.
pub struct Variant {
    /// Name of the configuration block.
    pub name: &'static str,
    /// Check bundle `type` on the wire.
    pub wire_type: &'static str,
    pub description: &'static str,
    pub schema: fn() -> Schema,
    pub hash: SetHash,
    pub descriptions: &'static [(&'static str, &'static str)],
}

macro_rules! variant {
    ($module:ident, $wire:literal, $description:literal) => {
        Variant {
            name: stringify!($module),
            wire_type: $wire,
            description: $description,
            schema: $module::schema,
            hash: $module::hash,
            descriptions: $module::DESCRIPTIONS,
        }
    };
}

pub const VARIANTS: &[Variant] = &[
    variant!(caql, "caql", "Evaluates a CAQL statement"),
    variant!(cloudwatch, "cloudwatch", "Polls AWS CloudWatch metrics"),
    variant!(consul, "consul", "Queries the health API of a Consul agent"),
    variant!(dns, "dns", "Resolves a DNS record"),
    variant!(external, "external", "Runs a command on the collector"),
    variant!(http, "http", "Requests an HTTP endpoint"),
    variant!(httptrap, "httptrap", "Accepts metrics pushed over HTTP"),
    variant!(icmp_ping, "ping_icmp", "Pings the target over ICMP"),
    variant!(jmx, "jmx", "Polls JMX MBeans"),
    variant!(json, "json", "Requests an HTTP endpoint returning JSON metrics"),
    variant!(memcached, "memcached", "Polls memcached statistics"),
    variant!(mysql, "mysql", "Runs a query against MySQL"),
    variant!(ntp, "ntp", "Queries an NTP server"),
    variant!(promtext, "promtext", "Scrapes a Prometheus text endpoint"),
    variant!(redis, "redis", "Polls Redis"),
    variant!(smtp, "smtp", "Sends mail through an SMTP server"),
    variant!(snmp, "snmp", "Polls SNMP OIDs"),
    variant!(ssh2, "ssh2", "Inspects the SSH2 handshake of the target"),
    variant!(statsd, "statsd", "Accepts StatsD metrics from a source IP"),
    variant!(tcp, "tcp", "Connects to a TCP port"),
];

pub fn lookup(name: &str) -> Option<&'static Variant> {
    VARIANTS.iter().find(|v| v.name == name)
}

/// Encode `variant` into the `type` and `config` of `bundle`. The bundle's
/// common attributes, including any configured target, are already set.
pub fn encode(variant: &CheckVariant, bundle: &mut CheckBundle) {
    bundle.type_ = lookup(variant.name())
        .map(|v| v.wire_type)
        .unwrap_or_else(|| variant.name())
        .to_string();

    match variant {
        CheckVariant::Caql(v) => caql::encode(v, bundle),
        CheckVariant::CloudWatch(v) => cloudwatch::encode(v, bundle),
        CheckVariant::Consul(v) => consul::encode(v, bundle),
        CheckVariant::Dns(v) => dns::encode(v, bundle),
        CheckVariant::External(v) => external::encode(v, bundle),
        CheckVariant::Http(v) => http::encode(v, bundle),
        CheckVariant::HttpTrap(v) => httptrap::encode(v, bundle),
        CheckVariant::IcmpPing(v) => icmp_ping::encode(v, bundle),
        CheckVariant::Jmx(v) => jmx::encode(v, bundle),
        CheckVariant::Json(v) => json::encode(v, bundle),
        CheckVariant::Memcached(v) => memcached::encode(v, bundle),
        CheckVariant::MySql(v) => mysql::encode(v, bundle),
        CheckVariant::Ntp(v) => ntp::encode(v, bundle),
        CheckVariant::PromText(v) => promtext::encode(v, bundle),
        CheckVariant::Redis(v) => redis::encode(v, bundle),
        CheckVariant::Smtp(v) => smtp::encode(v, bundle),
        CheckVariant::Snmp(v) => snmp::encode(v, bundle),
        CheckVariant::Ssh2(v) => ssh2::encode(v, bundle),
        CheckVariant::StatsD(v) => statsd::encode(v, bundle),
        CheckVariant::Tcp(v) => tcp::encode(v, bundle),
    }
}

/// Decode the variant of `bundle`, consuming its keys from `swamp`.
pub fn decode(bundle: &CheckBundle, swamp: &mut Swamp) -> Result<CheckVariant, Error> {
    Ok(match bundle.type_.as_str() {
        "caql" => CheckVariant::Caql(caql::decode(bundle, swamp)?),
        "cloudwatch" => CheckVariant::CloudWatch(cloudwatch::decode(bundle, swamp)?),
        "consul" => CheckVariant::Consul(consul::decode(bundle, swamp)?),
        "dns" => CheckVariant::Dns(dns::decode(bundle, swamp)?),
        "external" => CheckVariant::External(external::decode(bundle, swamp)?),
        "http" => CheckVariant::Http(http::decode(bundle, swamp)?),
        "httptrap" => CheckVariant::HttpTrap(httptrap::decode(bundle, swamp)?),
        "ping_icmp" => CheckVariant::IcmpPing(icmp_ping::decode(bundle, swamp)?),
        "jmx" => CheckVariant::Jmx(jmx::decode(bundle, swamp)?),
        "json" => CheckVariant::Json(json::decode(bundle, swamp)?),
        "memcached" => CheckVariant::Memcached(memcached::decode(bundle, swamp)?),
        "mysql" => CheckVariant::MySql(mysql::decode(bundle, swamp)?),
        "ntp" => CheckVariant::Ntp(ntp::decode(bundle, swamp)?),
        "promtext" => CheckVariant::PromText(promtext::decode(bundle, swamp)?),
        "redis" => CheckVariant::Redis(redis::decode(bundle, swamp)?),
        "smtp" => CheckVariant::Smtp(smtp::decode(bundle, swamp)?),
        "snmp" => CheckVariant::Snmp(snmp::decode(bundle, swamp)?),
        "ssh2" => CheckVariant::Ssh2(ssh2::decode(bundle, swamp)?),
        "statsd" => CheckVariant::StatsD(statsd::decode(bundle, swamp)?),
        "tcp" => CheckVariant::Tcp(tcp::decode(bundle, swamp)?),
        other => return Err(provider_bug(format!("check type {other:?} is not supported"))),
    })
}

// Helpers for writing config keys.

/// Set `key`, unless `value` is empty.
fn put(config: &mut BTreeMap<String, String>, key: &str, value: impl ToString) {
    let value = value.to_string();
    if !value.is_empty() {
        config.insert(key.to_string(), value);
    }
}

fn put_opt<T: ToString>(config: &mut BTreeMap<String, String>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        put(config, key, value);
    }
}

fn put_bool(config: &mut BTreeMap<String, String>, key: &str, value: bool) {
    config.insert(key.to_string(), value.to_string());
}

/// Set `<prefix><name>` for every entry of `map`.
fn put_prefixed(config: &mut BTreeMap<String, String>, prefix: &str, map: &BTreeMap<String, String>) {
    for (name, value) in map {
        config.insert(format!("{prefix}{name}"), value.clone());
    }
}

/// Use `host` as the bundle's target, unless a target is configured.
fn default_target(bundle: &mut CheckBundle, host: Option<String>) {
    if bundle.target.is_empty() {
        if let Some(host) = host {
            bundle.target = host;
        }
    }
}

fn url_host(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Port of `url`, or the default port of its scheme.
fn url_port(url: &str) -> Option<u64> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.port_or_known_default())
        .map(u64::from)
}

/// Drop the port of a json or promtext check when it's the one derived
/// from its URL, and its `configured` block doesn't set a port.
pub fn elide_derived_port(variant: &mut CheckVariant, configured: Option<&Value>) {
    let Some(configured) = configured else {
        return;
    };
    if configured.get("port").is_some() {
        return;
    }
    let (port, url) = match variant {
        CheckVariant::Json(json) => (&mut json.port, json.url.as_str()),
        CheckVariant::PromText(prom) => (&mut prom.port, prom.url.as_str()),
        _ => return,
    };
    if port.is_some() && *port == url_port(url) {
        *port = None;
    }
}

fn split_list(value: Option<String>, sep: char) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validator of the URL attributes of HTTP-speaking variants.
fn http_url() -> schema::Validator {
    schema::Validator::Url {
        schemes: &["http", "https"],
    }
}

fn port() -> schema::Attribute {
    schema::Attribute::int().validate(schema::Validator::IntRange { min: 1, max: 65535 })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_variant_table_covers_every_block() {
        let names: Vec<_> = VARIANTS.iter().map(|v| v.name).collect();
        assert_eq!(names, CheckVariant::NAMES);

        for variant in VARIANTS {
            for (name, _) in variant.descriptions {
                assert!(
                    name.starts_with(&format!("{}.", variant.name)),
                    "{name} is not an attribute of {}",
                    variant.name
                );
            }
        }
    }

    #[test]
    fn test_url_helpers() {
        assert_eq!(url_host("https://api.example.com/metrics").as_deref(), Some("api.example.com"));
        assert_eq!(url_port("https://api.example.com/metrics"), Some(443));
        assert_eq!(url_port("http://localhost:9100/metrics"), Some(9100));
        assert_eq!(url_port("not a url"), None);
        assert_eq!(split_list(Some("a, b,,c".to_string()), ','), vec!["a", "b", "c"]);
    }
}
