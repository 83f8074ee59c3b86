use super::{put, put_opt, put_prefixed, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::External;
use schema::{Attribute, Kind, Schema};
use serde_json::Value;

pub fn schema() -> Schema {
    Schema::new()
        .attr("command", Attribute::string().required())
        .attr("env", Attribute::map(Kind::String))
        .attr("output_extract", Attribute::string())
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("external.command", "Command to run on the collector"),
    ("external.env", "Environment of the command"),
    ("external.output_extract", "How metrics are parsed from the command's output: json, nagios, or a regex"),
];

const FIELDS: &[Field] = &[Field::Str("command"), Field::Map("env"), Field::Str("output_extract")];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(external: &External, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put(config, "command", &external.command);
    put_prefixed(config, "env_", &external.env);
    put_opt(config, "output_extract", external.output_extract.as_ref());
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<External, Error> {
    Ok(External {
        command: swamp.take("command").unwrap_or_default(),
        env: swamp.take_prefixed("env_"),
        output_extract: swamp.take("output_extract"),
    })
}
