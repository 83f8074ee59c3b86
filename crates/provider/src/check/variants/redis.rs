use super::{port, put, put_opt, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Redis;
use schema::{Attribute, Schema, Validator};
use serde_json::Value;

pub const DEFAULT_COMMAND: &str = "INFO";
pub const DEFAULT_PORT: u64 = 6379;

pub fn schema() -> Schema {
    Schema::new()
        .attr("command", Attribute::string().default(DEFAULT_COMMAND))
        .attr(
            "db_index",
            Attribute::int().validate(Validator::IntRange { min: 0, max: 15 }),
        )
        .attr("password", Attribute::string().sensitive())
        .attr("port", port().default(DEFAULT_PORT))
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("redis.command", "Command whose reply becomes metrics"),
    ("redis.db_index", "Database to select"),
    ("redis.password", "Password of the Redis server"),
    ("redis.port", "Port of the Redis server"),
];

const FIELDS: &[Field] = &[
    Field::Str("command"),
    Field::Int("db_index"),
    Field::Str("password"),
    Field::Int("port"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(redis: &Redis, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put(config, "command", redis.command.as_deref().unwrap_or(DEFAULT_COMMAND));
    put_opt(config, "dbindex", redis.db_index);
    put_opt(config, "password", redis.password.as_ref());
    put(config, "port", redis.port.unwrap_or(DEFAULT_PORT));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Redis, Error> {
    Ok(Redis {
        command: swamp.take("command"),
        db_index: swamp.take_parsed("dbindex"),
        password: swamp.take("password"),
        port: swamp.take_parsed("port"),
    })
}
