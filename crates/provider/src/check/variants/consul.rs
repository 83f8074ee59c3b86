use super::{default_target, http_url, put, put_opt, put_prefixed, split_list, url_host, Swamp};
use crate::{
    error::fault,
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Consul;
use schema::{Attribute, Kind, Schema, Validator};
use serde_json::Value;
use url::Url;

pub const DEFAULT_HTTP_ADDR: &str = "http://consul.service.consul";
const TOKEN_HEADER: &str = "X-Consul-Token";
const STATES: &[&str] = &["any", "passing", "warning", "critical"];

pub fn schema() -> Schema {
    Schema::new()
        .attr("acl_token", Attribute::string().sensitive())
        .attr("allow_stale", Attribute::bool())
        .attr("ca_chain", Attribute::string())
        .attr("certificate_file", Attribute::string())
        .attr("check_name_blacklist", Attribute::list(Kind::String))
        .attr("ciphers", Attribute::string())
        .attr("dc", Attribute::string())
        .attr("headers", Attribute::map(Kind::String))
        .attr(
            "http_addr",
            Attribute::string()
                .default(DEFAULT_HTTP_ADDR)
                .validate(http_url()),
        )
        .attr("key_file", Attribute::string())
        .attr("node", Attribute::string())
        .attr("node_blacklist", Attribute::list(Kind::String))
        .attr("service", Attribute::string())
        .attr("service_blacklist", Attribute::list(Kind::String))
        .attr("state", Attribute::string().validate(Validator::OneOf(STATES)))
        .exactly_one_of(&["node", "service", "state"])
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("consul.acl_token", "ACL token sent as the X-Consul-Token header"),
    ("consul.allow_stale", "Allow any Consul server to answer, rather than only the leader"),
    ("consul.ca_chain", "Path to a CA chain used to verify the agent"),
    ("consul.certificate_file", "Path to a client certificate"),
    ("consul.check_name_blacklist", "Health checks to ignore, by name"),
    ("consul.ciphers", "OpenSSL cipher list"),
    ("consul.dc", "Datacenter to query"),
    ("consul.headers", "Additional HTTP request headers"),
    ("consul.http_addr", "Base URL of the Consul agent"),
    ("consul.key_file", "Path to the key of the client certificate"),
    ("consul.node", "Report the health of this node"),
    ("consul.node_blacklist", "Nodes to ignore, by name"),
    ("consul.service", "Report the health of this service"),
    ("consul.service_blacklist", "Services to ignore, by name"),
    ("consul.state", "Report every health check in this state"),
];

const FIELDS: &[Field] = &[
    Field::Str("acl_token"),
    Field::Bool("allow_stale"),
    Field::Str("ca_chain"),
    Field::Str("certificate_file"),
    Field::List("check_name_blacklist"),
    Field::Str("ciphers"),
    Field::Str("dc"),
    Field::Map("headers"),
    Field::Str("http_addr"),
    Field::Str("key_file"),
    Field::Str("node"),
    Field::List("node_blacklist"),
    Field::Str("service"),
    Field::List("service_blacklist"),
    Field::Str("state"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

/// Health endpoint of the agent for the configured node, service, or state.
fn health_url(consul: &Consul) -> Option<Url> {
    let base = consul.http_addr.as_deref().unwrap_or(DEFAULT_HTTP_ADDR);
    let mut url = Url::parse(base).ok()?;

    let (kind, name) = match (&consul.node, &consul.service, &consul.state) {
        (Some(node), _, _) => ("node", node),
        (_, Some(service), _) => ("checks", service),
        (_, _, Some(state)) => ("state", state),
        _ => return None,
    };
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["v1", "health", kind, name.as_str()]);

    if consul.dc.is_some() || consul.allow_stale {
        let mut query = url.query_pairs_mut();
        if let Some(dc) = &consul.dc {
            query.append_pair("dc", dc);
        }
        if consul.allow_stale {
            query.append_key_only("stale");
        }
    }
    Some(url)
}

pub fn encode(consul: &Consul, bundle: &mut CheckBundle) {
    let url = health_url(consul);
    let config = &mut bundle.config;

    if let Some(url) = &url {
        put(config, "url", url);
    }
    put_prefixed(config, "header_", &consul.headers);
    if let Some(token) = &consul.acl_token {
        put(config, &format!("header_{TOKEN_HEADER}"), token);
    }
    put_opt(config, "ca_chain", consul.ca_chain.as_ref());
    put_opt(config, "certificate_file", consul.certificate_file.as_ref());
    put_opt(config, "ciphers", consul.ciphers.as_ref());
    put_opt(config, "key_file", consul.key_file.as_ref());
    put(config, "check_name_blacklist", consul.check_name_blacklist.join(","));
    put(config, "node_blacklist", consul.node_blacklist.join(","));
    put(config, "service_blacklist", consul.service_blacklist.join(","));

    default_target(bundle, url.and_then(|u| url_host(u.as_str())));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Consul, Error> {
    let mut headers = swamp.take_prefixed("header_");
    let acl_token = headers.remove(TOKEN_HEADER);

    let mut consul = Consul {
        acl_token,
        ca_chain: swamp.take("ca_chain"),
        certificate_file: swamp.take("certificate_file"),
        check_name_blacklist: split_list(swamp.take("check_name_blacklist"), ','),
        ciphers: swamp.take("ciphers"),
        headers,
        key_file: swamp.take("key_file"),
        node_blacklist: split_list(swamp.take("node_blacklist"), ','),
        service_blacklist: split_list(swamp.take("service_blacklist"), ','),
        ..Default::default()
    };

    let Some(raw) = swamp.take("url") else {
        fault("consul check has no url");
        return Ok(consul);
    };
    let url = match Url::parse(&raw) {
        Ok(url) => url,
        Err(err) => {
            fault(format_args!("consul check has unparseable url {raw:?}: {err}"));
            return Ok(consul);
        }
    };

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "dc" => consul.dc = Some(value.into_owned()),
            "stale" => consul.allow_stale = true,
            other => fault(format_args!("consul url has unknown query parameter {other:?}")),
        }
    }

    let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();
    let Some(at) = segments.windows(2).rposition(|w| w == ["v1", "health"]) else {
        fault(format_args!("consul url {raw:?} isn't a health endpoint"));
        return Ok(consul);
    };
    let prefix = &segments[..at];
    let (kind, name) = match &segments[at + 2..] {
        [kind, name] => (*kind, name.to_string()),
        _ => {
            fault(format_args!("consul url {raw:?} isn't a health endpoint"));
            return Ok(consul);
        }
    };
    let name = percent_encoding::percent_decode_str(&name)
        .decode_utf8_lossy()
        .into_owned();

    match kind {
        "node" => consul.node = Some(name),
        "checks" => consul.service = Some(name),
        "state" => consul.state = Some(name),
        other => fault(format_args!("consul url has unknown health endpoint {other:?}")),
    }

    let mut base = url.clone();
    base.set_query(None);
    base.set_path(&prefix.join("/"));
    let base = base.as_str().trim_end_matches('/').to_string();
    consul.http_addr = Some(base);

    Ok(consul)
}
