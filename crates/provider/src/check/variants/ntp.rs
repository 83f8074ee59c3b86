use super::{port, put, put_bool, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Ntp;
use schema::{Attribute, Schema};
use serde_json::Value;

pub const DEFAULT_PORT: u64 = 123;

pub fn schema() -> Schema {
    Schema::new()
        .attr("port", port().default(DEFAULT_PORT))
        .attr("use_control", Attribute::bool())
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("ntp.port", "Port of the NTP server"),
    ("ntp.use_control", "Query with NTP control messages rather than time requests"),
];

const FIELDS: &[Field] = &[Field::Int("port"), Field::Bool("use_control")];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(ntp: &Ntp, bundle: &mut CheckBundle) {
    put(&mut bundle.config, "port", ntp.port.unwrap_or(DEFAULT_PORT));
    put_bool(&mut bundle.config, "use_control", ntp.use_control);
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Ntp, Error> {
    Ok(Ntp {
        port: swamp.take_parsed("port"),
        use_control: swamp.take_bool("use_control"),
    })
}
