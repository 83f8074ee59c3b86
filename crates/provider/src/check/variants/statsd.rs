use super::Swamp;
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::StatsD;
use schema::{Attribute, Schema, Validator};
use serde_json::Value;

pub fn schema() -> Schema {
    Schema::new().attr(
        "source_ip",
        Attribute::string()
            .required()
            .validate(Validator::regex(r"^[0-9a-fA-F:.]+$")),
    )
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[(
    "statsd.source_ip",
    "IP address from which metrics are accepted, which is also the check's target",
)];

const FIELDS: &[Field] = &[Field::Str("source_ip")];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(statsd: &StatsD, bundle: &mut CheckBundle) {
    bundle.target = statsd.source_ip.clone();
}

pub fn decode(bundle: &CheckBundle, _swamp: &mut Swamp) -> Result<StatsD, Error> {
    Ok(StatsD {
        source_ip: bundle.target.clone(),
    })
}
