use super::{port, put, put_opt, split_list, Swamp};
use crate::{
    error::fault,
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::{Jmx, MbeanProperty};
use schema::{Attribute, Kind, Schema};
use serde_json::Value;

const PROPERTY_PREFIX: &str = "mbean_properties_";

pub fn schema() -> Schema {
    let property = Schema::new()
        .attr("index", Attribute::int().required())
        .attr("name", Attribute::string().required())
        .attr("type", Attribute::string().required());

    Schema::new()
        .attr("host", Attribute::string().required())
        .attr("mbean_domains", Attribute::list(Kind::String).required().min_items(1))
        .attr("mbean_properties", Attribute::list(Kind::Block(property)))
        .attr("password", Attribute::string().sensitive())
        .attr("port", port())
        .attr("uri", Attribute::string())
        .attr("username", Attribute::string())
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("jmx.host", "Host of the JMX service, which is also the check's target"),
    ("jmx.mbean_domains", "MBean domains to poll"),
    ("jmx.mbean_properties", "ObjectName key properties which MBeans must have"),
    ("jmx.mbean_properties.index", "Position of the property"),
    ("jmx.mbean_properties.name", "Key of the property"),
    ("jmx.mbean_properties.type", "Value of the property"),
    ("jmx.password", "Password of the JMX service"),
    ("jmx.port", "Port of the JMX service"),
    ("jmx.uri", "Path of the JMX service URL"),
    ("jmx.username", "User of the JMX service"),
];

const FIELDS: &[Field] = &[
    Field::Str("host"),
    Field::List("mbean_domains"),
    Field::Blocks {
        name: "mbean_properties",
        key: "index",
        fields: &[Field::Int("index"), Field::Str("name"), Field::Str("type")],
    },
    Field::Str("password"),
    Field::Int("port"),
    Field::Str("uri"),
    Field::Str("username"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(jmx: &Jmx, bundle: &mut CheckBundle) {
    bundle.target = jmx.host.clone();

    let config = &mut bundle.config;
    put(config, "mbean_domains", jmx.mbean_domains.join(" "));
    for prop in &jmx.mbean_properties {
        put(
            config,
            &format!("{PROPERTY_PREFIX}{}", prop.index),
            format!("name={},type={}", prop.name, prop.type_),
        );
    }
    put_opt(config, "password", jmx.password.as_ref());
    put_opt(config, "port", jmx.port);
    put_opt(config, "uri", jmx.uri.as_ref());
    put_opt(config, "username", jmx.username.as_ref());
}

pub fn decode(bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Jmx, Error> {
    let mut mbean_properties = Vec::new();

    for (index, value) in swamp.take_prefixed(PROPERTY_PREFIX) {
        match parse_property(&index, &value) {
            Some(prop) => mbean_properties.push(prop),
            None => fault(format_args!(
                "jmx check has malformed {PROPERTY_PREFIX}{index} {value:?}"
            )),
        }
    }
    mbean_properties.sort_by_key(|p| p.index);

    Ok(Jmx {
        host: bundle.target.clone(),
        mbean_domains: split_list(swamp.take("mbean_domains"), ' '),
        mbean_properties,
        password: swamp.take("password"),
        port: swamp.take_parsed("port"),
        uri: swamp.take("uri"),
        username: swamp.take("username"),
    })
}

/// Parse `name=<name>,type=<type>`.
fn parse_property(index: &str, value: &str) -> Option<MbeanProperty> {
    let mut prop = MbeanProperty {
        index: index.parse().ok()?,
        ..Default::default()
    };
    for pair in value.split(',') {
        match pair.split_once('=')? {
            ("name", name) => prop.name = name.to_string(),
            ("type", type_) => prop.type_ = type_.to_string(),
            _ => return None,
        }
    }
    Some(prop)
}
