use super::{put, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Caql;
use schema::{Attribute, Schema};
use serde_json::Value;

/// CAQL checks have no target of their own, and use this fixed one.
pub const TARGET: &str = "q._caql";

pub fn schema() -> Schema {
    Schema::new().attr("query", Attribute::string().required())
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[("caql.query", "The CAQL statement to evaluate")];

const FIELDS: &[Field] = &[Field::Str("query")];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(caql: &Caql, bundle: &mut CheckBundle) {
    bundle.target = TARGET.to_string();
    put(&mut bundle.config, "query", &caql.query);
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Caql, Error> {
    Ok(Caql {
        query: swamp.take("query").unwrap_or_default(),
    })
}
