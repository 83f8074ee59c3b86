use super::{default_target, http_url, port, put, put_opt, url_host, url_port, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::PromText;
use schema::{Attribute, Schema};
use serde_json::Value;

pub fn schema() -> Schema {
    Schema::new()
        .attr("port", port())
        .attr("url", Attribute::string().required().validate(http_url()))
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("promtext.port", "Port to connect to, defaulting to the port of the URL"),
    ("promtext.url", "URL of the Prometheus text exposition"),
];

const FIELDS: &[Field] = &[Field::Int("port"), Field::Str("url")];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(prom: &PromText, bundle: &mut CheckBundle) {
    put_opt(&mut bundle.config, "port", prom.port.or_else(|| url_port(&prom.url)));
    put(&mut bundle.config, "url", &prom.url);

    default_target(bundle, url_host(&prom.url));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<PromText, Error> {
    Ok(PromText {
        port: swamp.take_parsed("port"),
        url: swamp.take("url").unwrap_or_default(),
    })
}
