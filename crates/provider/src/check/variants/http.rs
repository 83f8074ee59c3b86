use super::{default_target, http_url, put, put_opt, put_prefixed, url_host, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Http;
use schema::{Attribute, Kind, Schema, Validator};
use serde_json::Value;

pub const AUTH_METHODS: &[&str] = &["Basic", "Digest", "Auto"];
pub const HTTP_VERSIONS: &[&str] = &["1.0", "1.1", "2.0"];
pub const METHODS: &[&str] = &["GET", "HEAD", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"];

pub fn schema() -> Schema {
    Schema::new()
        .attr("auth_method", Attribute::string().validate(Validator::OneOf(AUTH_METHODS)))
        .attr("auth_password", Attribute::string().sensitive())
        .attr("auth_user", Attribute::string())
        .attr("body_regexp", Attribute::string())
        .attr("ca_chain", Attribute::string())
        .attr("certificate_file", Attribute::string())
        .attr("ciphers", Attribute::string())
        .attr("code", Attribute::string().default("^200$"))
        .attr("extract", Attribute::string())
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
        .attr("read_limit", Attribute::int().validate(Validator::IntRange { min: 0, max: i64::MAX }))
        .attr("redirects", Attribute::int().validate(Validator::IntRange { min: 0, max: 100 }))
        .attr("url", Attribute::string().required().validate(http_url()))
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("http.auth_method", "HTTP authentication method"),
    ("http.auth_password", "Password of HTTP authentication"),
    ("http.auth_user", "User of HTTP authentication"),
    ("http.body_regexp", "Regex which the response body must match"),
    ("http.ca_chain", "Path to a CA chain used to verify the server"),
    ("http.certificate_file", "Path to a client certificate"),
    ("http.ciphers", "OpenSSL cipher list"),
    ("http.code", "Regex which the response status code must match"),
    ("http.extract", "Regex whose named captures are extracted from the body as metrics"),
    ("http.headers", "Additional HTTP request headers"),
    ("http.http_version", "HTTP protocol version"),
    ("http.key_file", "Path to the key of the client certificate"),
    ("http.method", "HTTP request method"),
    ("http.payload", "Request body"),
    ("http.read_limit", "Maximum bytes of the response to read"),
    ("http.redirects", "Maximum redirects to follow"),
    ("http.url", "URL to request"),
];

const FIELDS: &[Field] = &[
    Field::Str("auth_method"),
    Field::Str("auth_password"),
    Field::Str("auth_user"),
    Field::Str("body_regexp"),
    Field::Str("ca_chain"),
    Field::Str("certificate_file"),
    Field::Str("ciphers"),
    Field::Str("code"),
    Field::Str("extract"),
    Field::Map("headers"),
    Field::Str("http_version"),
    Field::Str("key_file"),
    Field::Str("method"),
    Field::Str("payload"),
    Field::Int("read_limit"),
    Field::Int("redirects"),
    Field::Str("url"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(http: &Http, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put_opt(config, "auth_method", http.auth_method.as_ref());
    put_opt(config, "auth_password", http.auth_password.as_ref());
    put_opt(config, "auth_user", http.auth_user.as_ref());
    put_opt(config, "body", http.body_regexp.as_ref());
    put_opt(config, "ca_chain", http.ca_chain.as_ref());
    put_opt(config, "certificate_file", http.certificate_file.as_ref());
    put_opt(config, "ciphers", http.ciphers.as_ref());
    put_opt(config, "code", http.code.as_ref());
    put_opt(config, "extract", http.extract.as_ref());
    put_prefixed(config, "header_", &http.headers);
    put_opt(config, "http_version", http.http_version.as_ref());
    put_opt(config, "key_file", http.key_file.as_ref());
    put_opt(config, "method", http.method.as_ref());
    put_opt(config, "payload", http.payload.as_ref());
    put_opt(config, "read_limit", http.read_limit);
    put_opt(config, "redirects", http.redirects);
    put(config, "url", &http.url);

    default_target(bundle, url_host(&http.url));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Http, Error> {
    Ok(Http {
        auth_method: swamp.take("auth_method"),
        auth_password: swamp.take("auth_password"),
        auth_user: swamp.take("auth_user"),
        body_regexp: swamp.take("body"),
        ca_chain: swamp.take("ca_chain"),
        certificate_file: swamp.take("certificate_file"),
        ciphers: swamp.take("ciphers"),
        code: swamp.take("code"),
        extract: swamp.take("extract"),
        headers: swamp.take_prefixed("header_"),
        http_version: swamp.take("http_version"),
        key_file: swamp.take("key_file"),
        method: swamp.take("method"),
        payload: swamp.take("payload"),
        read_limit: swamp.take_parsed("read_limit"),
        redirects: swamp.take_parsed("redirects"),
        url: swamp.take("url").unwrap_or_default(),
    })
}
