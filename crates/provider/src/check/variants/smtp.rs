use super::{port, put, put_bool, put_opt, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Smtp;
use schema::{Attribute, Schema};
use serde_json::Value;

pub const DEFAULT_PORT: u64 = 25;

pub fn schema() -> Schema {
    Schema::new()
        .attr("ehlo", Attribute::string())
        .attr("from", Attribute::string())
        .attr("payload", Attribute::string())
        .attr("port", port().default(DEFAULT_PORT))
        .attr("sasl_auth_id", Attribute::string())
        .attr("sasl_authentication", Attribute::string())
        .attr("sasl_password", Attribute::string().sensitive())
        .attr("sasl_user", Attribute::string())
        .attr("starttls", Attribute::bool())
        .attr("to", Attribute::string())
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("smtp.ehlo", "Name given in the EHLO greeting"),
    ("smtp.from", "Envelope sender"),
    ("smtp.payload", "Message to send"),
    ("smtp.port", "Port of the SMTP server"),
    ("smtp.sasl_auth_id", "SASL authorization identity"),
    ("smtp.sasl_authentication", "SASL mechanism"),
    ("smtp.sasl_password", "SASL password"),
    ("smtp.sasl_user", "SASL user"),
    ("smtp.starttls", "Upgrade the connection with STARTTLS"),
    ("smtp.to", "Envelope recipient"),
];

const FIELDS: &[Field] = &[
    Field::Str("ehlo"),
    Field::Str("from"),
    Field::Str("payload"),
    Field::Int("port"),
    Field::Str("sasl_auth_id"),
    Field::Str("sasl_authentication"),
    Field::Str("sasl_password"),
    Field::Str("sasl_user"),
    Field::Bool("starttls"),
    Field::Str("to"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(smtp: &Smtp, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put_opt(config, "ehlo", smtp.ehlo.as_ref());
    put_opt(config, "from", smtp.from.as_ref());
    put_opt(config, "payload", smtp.payload.as_ref());
    put(config, "port", smtp.port.unwrap_or(DEFAULT_PORT));
    put_opt(config, "sasl_auth_id", smtp.sasl_auth_id.as_ref());
    put_opt(config, "sasl_authentication", smtp.sasl_authentication.as_ref());
    put_opt(config, "sasl_password", smtp.sasl_password.as_ref());
    put_opt(config, "sasl_user", smtp.sasl_user.as_ref());
    put_bool(config, "starttls", smtp.starttls);
    put_opt(config, "to", smtp.to.as_ref());
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Smtp, Error> {
    Ok(Smtp {
        ehlo: swamp.take("ehlo"),
        from: swamp.take("from"),
        payload: swamp.take("payload"),
        port: swamp.take_parsed("port"),
        sasl_auth_id: swamp.take("sasl_auth_id"),
        sasl_authentication: swamp.take("sasl_authentication"),
        sasl_password: swamp.take("sasl_password"),
        sasl_user: swamp.take("sasl_user"),
        starttls: swamp.take_bool("starttls"),
        to: swamp.take("to"),
    })
}
