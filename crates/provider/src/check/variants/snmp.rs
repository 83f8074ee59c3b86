use super::{port, put, put_bool, put_opt, Swamp};
use crate::{
    error::fault,
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::{Snmp, SnmpOid};
use schema::{Attribute, Kind, Schema, Validator};
use serde_json::Value;

pub const DEFAULT_PORT: u64 = 161;
pub const DEFAULT_VERSION: &str = "2c";

pub fn schema() -> Schema {
    let oid = Schema::new()
        .attr("name", Attribute::string().required())
        .attr("path", Attribute::string().required())
        .attr("type", Attribute::string());

    Schema::new()
        .attr("auth_passphrase", Attribute::string().sensitive())
        .attr("auth_protocol", Attribute::string().validate(Validator::OneOf(&["MD5", "SHA"])))
        .attr("community", Attribute::string().sensitive())
        .attr("context_engine", Attribute::string())
        .attr("context_name", Attribute::string())
        .attr("oid", Attribute::list(Kind::Block(oid)).required().min_items(1))
        .attr("port", port().default(DEFAULT_PORT))
        .attr("privacy_passphrase", Attribute::string().sensitive())
        .attr(
            "privacy_protocol",
            Attribute::string().validate(Validator::OneOf(&["DES", "AES"])),
        )
        .attr("security_engine", Attribute::string())
        .attr(
            "security_level",
            Attribute::string().validate(Validator::OneOf(&["noAuthNoPriv", "authNoPriv", "authPriv"])),
        )
        .attr("security_name", Attribute::string())
        .attr("separate_queries", Attribute::bool())
        .attr(
            "version",
            Attribute::string()
                .default(DEFAULT_VERSION)
                .validate(Validator::OneOf(&["1", "2c", "3"])),
        )
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("snmp.auth_passphrase", "SNMPv3 authentication passphrase"),
    ("snmp.auth_protocol", "SNMPv3 authentication protocol"),
    ("snmp.community", "SNMPv1 or v2c community"),
    ("snmp.context_engine", "SNMPv3 context engine ID"),
    ("snmp.context_name", "SNMPv3 context name"),
    ("snmp.oid", "OIDs to poll"),
    ("snmp.oid.name", "Name of the metric of the OID"),
    ("snmp.oid.path", "The OID, in numeric or symbolic form"),
    ("snmp.oid.type", "Metric type of the value"),
    ("snmp.port", "Port of the SNMP agent"),
    ("snmp.privacy_passphrase", "SNMPv3 privacy passphrase"),
    ("snmp.privacy_protocol", "SNMPv3 privacy protocol"),
    ("snmp.security_engine", "SNMPv3 security engine ID"),
    ("snmp.security_level", "SNMPv3 security level"),
    ("snmp.security_name", "SNMPv3 security name"),
    ("snmp.separate_queries", "Query each OID in its own request"),
    ("snmp.version", "SNMP protocol version"),
];

const FIELDS: &[Field] = &[
    Field::Str("auth_passphrase"),
    Field::Str("auth_protocol"),
    Field::Str("community"),
    Field::Str("context_engine"),
    Field::Str("context_name"),
    Field::Blocks {
        name: "oid",
        key: "name",
        fields: &[Field::Str("name"), Field::Str("path"), Field::Str("type")],
    },
    Field::Int("port"),
    Field::Str("privacy_passphrase"),
    Field::Str("privacy_protocol"),
    Field::Str("security_engine"),
    Field::Str("security_level"),
    Field::Str("security_name"),
    Field::Bool("separate_queries"),
    Field::Str("version"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(snmp: &Snmp, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put_opt(config, "auth_passphrase", snmp.auth_passphrase.as_ref());
    put_opt(config, "auth_protocol", snmp.auth_protocol.as_ref());
    put_opt(config, "community", snmp.community.as_ref());
    put_opt(config, "context_engine", snmp.context_engine.as_ref());
    put_opt(config, "context_name", snmp.context_name.as_ref());
    for oid in &snmp.oid {
        put(config, &format!("oid_{}", oid.name), &oid.path);
        put_opt(config, &format!("type_{}", oid.name), oid.type_.as_ref());
    }
    put(config, "port", snmp.port.unwrap_or(DEFAULT_PORT));
    put_opt(config, "privacy_passphrase", snmp.privacy_passphrase.as_ref());
    put_opt(config, "privacy_protocol", snmp.privacy_protocol.as_ref());
    put_opt(config, "security_engine", snmp.security_engine.as_ref());
    put_opt(config, "security_level", snmp.security_level.as_ref());
    put_opt(config, "security_name", snmp.security_name.as_ref());
    put_bool(config, "separate_queries", snmp.separate_queries);
    put(config, "version", snmp.version.as_deref().unwrap_or(DEFAULT_VERSION));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Snmp, Error> {
    let mut types = swamp.take_prefixed("type_");
    let oid = swamp
        .take_prefixed("oid_")
        .into_iter()
        .map(|(name, path)| SnmpOid {
            type_: types.remove(&name),
            name,
            path,
        })
        .collect();

    for name in types.keys() {
        fault(format_args!("snmp check has type_{name} without a matching OID"));
    }

    Ok(Snmp {
        auth_passphrase: swamp.take("auth_passphrase"),
        auth_protocol: swamp.take("auth_protocol"),
        community: swamp.take("community"),
        context_engine: swamp.take("context_engine"),
        context_name: swamp.take("context_name"),
        oid,
        port: swamp.take_parsed("port"),
        privacy_passphrase: swamp.take("privacy_passphrase"),
        privacy_protocol: swamp.take("privacy_protocol"),
        security_engine: swamp.take("security_engine"),
        security_level: swamp.take("security_level"),
        security_name: swamp.take("security_name"),
        separate_queries: swamp.take_bool("separate_queries"),
        version: swamp.take("version"),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_legacy_booleans_and_oids() {
        let config = [
            ("community", "public"),
            ("oid_sysUpTime", ".1.3.6.1.2.1.1.3.0"),
            ("oid_ifInOctets", ".1.3.6.1.2.1.2.2.1.10.1"),
            ("type_ifInOctets", "C"),
            ("port", "161"),
            ("separate_queries", "on"),
            ("version", "2c"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let bundle = CheckBundle {
            type_: "snmp".to_string(),
            config,
            ..Default::default()
        };
        let mut swamp = Swamp::new("snmp", &bundle.config);
        let snmp = decode(&bundle, &mut swamp).unwrap();
        swamp.finish().unwrap();

        assert!(snmp.separate_queries);
        assert_eq!(
            snmp.oid,
            vec![
                SnmpOid {
                    name: "ifInOctets".to_string(),
                    path: ".1.3.6.1.2.1.2.2.1.10.1".to_string(),
                    type_: Some("C".to_string()),
                },
                SnmpOid {
                    name: "sysUpTime".to_string(),
                    path: ".1.3.6.1.2.1.1.3.0".to_string(),
                    type_: None,
                },
            ]
        );

        let mut encoded = CheckBundle::default();
        encode(&snmp, &mut encoded);
        assert_eq!(encoded.config["separate_queries"], "true");
    }
}
