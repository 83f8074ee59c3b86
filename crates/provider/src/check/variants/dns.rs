use super::{put, put_opt, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Dns;
use schema::{Attribute, Schema, Validator};
use serde_json::Value;

const CTYPES: &[&str] = &["IN", "CH", "HS"];
const RTYPES: &[&str] = &[
    "A", "AAAA", "CAA", "CNAME", "DNSKEY", "DS", "MX", "NS", "PTR", "RRSIG", "SOA", "SRV", "TXT",
];

pub fn schema() -> Schema {
    Schema::new()
        .attr(
            "ctype",
            Attribute::string().default("IN").validate(Validator::OneOf(CTYPES)),
        )
        .attr("nameserver", Attribute::string().default("%[target]"))
        .attr("query", Attribute::string().required())
        .attr(
            "rtype",
            Attribute::string().default("A").validate(Validator::OneOf(RTYPES)),
        )
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("dns.ctype", "DNS class of the query"),
    ("dns.nameserver", "Nameserver to query, where %[target] is the check's target"),
    ("dns.query", "Name to resolve"),
    ("dns.rtype", "Record type of the query"),
];

const FIELDS: &[Field] = &[
    Field::Str("ctype"),
    Field::Str("nameserver"),
    Field::Str("query"),
    Field::Str("rtype"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(dns: &Dns, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put_opt(config, "ctype", dns.ctype.as_ref());
    put_opt(config, "nameserver", dns.nameserver.as_ref());
    put(config, "query", &dns.query);
    put_opt(config, "rtype", dns.rtype.as_ref());
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Dns, Error> {
    Ok(Dns {
        ctype: swamp.take("ctype"),
        nameserver: swamp.take("nameserver"),
        query: swamp.take("query").unwrap_or_default(),
        rtype: swamp.take("rtype"),
    })
}
