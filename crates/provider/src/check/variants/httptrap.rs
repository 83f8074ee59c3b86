use super::{put_bool, put_opt, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::HttpTrap;
use schema::{Attribute, Schema, Validator};
use serde_json::Value;

pub fn schema() -> Schema {
    Schema::new()
        .attr("async_metrics", Attribute::bool())
        .attr(
            "secret",
            Attribute::string()
                .sensitive()
                .validate(Validator::regex(r"^[a-zA-Z0-9_]+$")),
        )
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("httptrap.async_metrics", "Accept metrics asynchronously, rather than on the check's period"),
    ("httptrap.secret", "Secret which submissions must present"),
];

const FIELDS: &[Field] = &[Field::Bool("async_metrics"), Field::Str("secret")];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(trap: &HttpTrap, bundle: &mut CheckBundle) {
    put_bool(&mut bundle.config, "asynch_metrics", trap.async_metrics);
    put_opt(&mut bundle.config, "secret", trap.secret.as_ref());
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<HttpTrap, Error> {
    Ok(HttpTrap {
        async_metrics: swamp.take_bool("asynch_metrics"),
        secret: swamp.take("secret"),
    })
}
