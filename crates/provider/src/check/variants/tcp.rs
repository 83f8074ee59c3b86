use super::{port, put, put_bool, put_opt, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Tcp;
use schema::{Attribute, Schema};
use serde_json::Value;

pub fn schema() -> Schema {
    Schema::new()
        .attr("banner_regexp", Attribute::string())
        .attr("ca_chain", Attribute::string())
        .attr("certificate_file", Attribute::string())
        .attr("ciphers", Attribute::string())
        .attr("host", Attribute::string().required())
        .attr("key_file", Attribute::string())
        .attr("port", port().required())
        .attr("tls", Attribute::bool())
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("tcp.banner_regexp", "Regex which the banner of the service must match"),
    ("tcp.ca_chain", "Path to a CA chain used to verify the server"),
    ("tcp.certificate_file", "Path to a client certificate"),
    ("tcp.ciphers", "OpenSSL cipher list"),
    ("tcp.host", "Host to connect to, which is also the check's target"),
    ("tcp.key_file", "Path to the key of the client certificate"),
    ("tcp.port", "Port to connect to"),
    ("tcp.tls", "Negotiate TLS once connected"),
];

const FIELDS: &[Field] = &[
    Field::Str("banner_regexp"),
    Field::Str("ca_chain"),
    Field::Str("certificate_file"),
    Field::Str("ciphers"),
    Field::Str("host"),
    Field::Str("key_file"),
    Field::Int("port"),
    Field::Bool("tls"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(tcp: &Tcp, bundle: &mut CheckBundle) {
    bundle.target = tcp.host.clone();

    let config = &mut bundle.config;
    put_opt(config, "banner_match", tcp.banner_regexp.as_ref());
    put_opt(config, "ca_chain", tcp.ca_chain.as_ref());
    put_opt(config, "certificate_file", tcp.certificate_file.as_ref());
    put_opt(config, "ciphers", tcp.ciphers.as_ref());
    put_opt(config, "key_file", tcp.key_file.as_ref());
    put(config, "port", tcp.port);
    put_bool(config, "use_ssl", tcp.tls);
}

pub fn decode(bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Tcp, Error> {
    Ok(Tcp {
        banner_regexp: swamp.take("banner_match"),
        ca_chain: swamp.take("ca_chain"),
        certificate_file: swamp.take("certificate_file"),
        ciphers: swamp.take("ciphers"),
        host: bundle.target.clone(),
        key_file: swamp.take("key_file"),
        port: swamp.take_parsed("port").unwrap_or_default(),
        tls: swamp.take_bool("use_ssl"),
    })
}
