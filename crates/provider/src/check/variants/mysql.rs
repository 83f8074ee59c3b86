use super::{put, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::MySql;
use schema::{Attribute, Schema};
use serde_json::Value;

pub fn schema() -> Schema {
    Schema::new()
        .attr("dsn", Attribute::string().required().sensitive())
        .attr("query", Attribute::string().required())
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("mysql.dsn", "Connection string of the database"),
    ("mysql.query", "Query whose result columns become metrics"),
];

const FIELDS: &[Field] = &[Field::Str("dsn"), Field::Str("query")];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(mysql: &MySql, bundle: &mut CheckBundle) {
    put(&mut bundle.config, "dsn", &mysql.dsn);
    put(&mut bundle.config, "sql", &mysql.query);
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<MySql, Error> {
    Ok(MySql {
        dsn: swamp.take("dsn").unwrap_or_default(),
        query: swamp.take("sql").unwrap_or_default(),
    })
}
