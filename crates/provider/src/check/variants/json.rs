use super::{
    default_target, http::{AUTH_METHODS, HTTP_VERSIONS, METHODS}, http_url, port, put, put_opt,
    put_prefixed, url_host, url_port, Swamp,
};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Json;
use schema::{Attribute, Kind, Schema, Validator};
use serde_json::Value;

pub fn schema() -> Schema {
    Schema::new()
        .attr("auth_method", Attribute::string().validate(Validator::OneOf(AUTH_METHODS)))
        .attr("auth_password", Attribute::string().sensitive())
        .attr("auth_user", Attribute::string())
        .attr("ca_chain", Attribute::string())
        .attr("certificate_file", Attribute::string())
        .attr("ciphers", Attribute::string())
        .attr("headers", Attribute::map(Kind::String))
        .attr(
            "http_version",
            Attribute::string().default("1.1").validate(Validator::OneOf(HTTP_VERSIONS)),
        )
        .attr("key_file", Attribute::string())
        .attr(
            "method",
            Attribute::string().default("GET").validate(Validator::OneOf(METHODS)),
        )
        .attr("payload", Attribute::string())
        .attr("port", port())
        .attr("read_limit", Attribute::int().validate(Validator::IntRange { min: 0, max: i64::MAX }))
        .attr("url", Attribute::string().required().validate(http_url()))
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("json.auth_method", "HTTP authentication method"),
    ("json.auth_password", "Password of HTTP authentication"),
    ("json.auth_user", "User of HTTP authentication"),
    ("json.ca_chain", "Path to a CA chain used to verify the server"),
    ("json.certificate_file", "Path to a client certificate"),
    ("json.ciphers", "OpenSSL cipher list"),
    ("json.headers", "Additional HTTP request headers"),
    ("json.http_version", "HTTP protocol version"),
    ("json.key_file", "Path to the key of the client certificate"),
    ("json.method", "HTTP request method"),
    ("json.payload", "Request body"),
    ("json.port", "Port to connect to, defaulting to the port of the URL"),
    ("json.read_limit", "Maximum bytes of the response to read"),
    ("json.url", "URL returning a JSON document of metrics"),
];

const FIELDS: &[Field] = &[
    Field::Str("auth_method"),
    Field::Str("auth_password"),
    Field::Str("auth_user"),
    Field::Str("ca_chain"),
    Field::Str("certificate_file"),
    Field::Str("ciphers"),
    Field::Map("headers"),
    Field::Str("http_version"),
    Field::Str("key_file"),
    Field::Str("method"),
    Field::Str("payload"),
    Field::Int("port"),
    Field::Int("read_limit"),
    Field::Str("url"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(json: &Json, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put_opt(config, "auth_method", json.auth_method.as_ref());
    put_opt(config, "auth_password", json.auth_password.as_ref());
    put_opt(config, "auth_user", json.auth_user.as_ref());
    put_opt(config, "ca_chain", json.ca_chain.as_ref());
    put_opt(config, "certificate_file", json.certificate_file.as_ref());
    put_opt(config, "ciphers", json.ciphers.as_ref());
    put_prefixed(config, "header_", &json.headers);
    put_opt(config, "http_version", json.http_version.as_ref());
    put_opt(config, "key_file", json.key_file.as_ref());
    put_opt(config, "method", json.method.as_ref());
    put_opt(config, "payload", json.payload.as_ref());
    put_opt(config, "port", json.port.or_else(|| url_port(&json.url)));
    put_opt(config, "read_limit", json.read_limit);
    put(config, "url", &json.url);

    default_target(bundle, url_host(&json.url));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Json, Error> {
    Ok(Json {
        auth_method: swamp.take("auth_method"),
        auth_password: swamp.take("auth_password"),
        auth_user: swamp.take("auth_user"),
        ca_chain: swamp.take("ca_chain"),
        certificate_file: swamp.take("certificate_file"),
        ciphers: swamp.take("ciphers"),
        headers: swamp.take_prefixed("header_"),
        http_version: swamp.take("http_version"),
        key_file: swamp.take("key_file"),
        method: swamp.take("method"),
        payload: swamp.take("payload"),
        port: swamp.take_parsed("port"),
        read_limit: swamp.take_parsed("read_limit"),
        url: swamp.take("url").unwrap_or_default(),
    })
}
