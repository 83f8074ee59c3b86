use super::{port, put, put_opt, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Ssh2;
use schema::{Attribute, Schema};
use serde_json::Value;

pub const DEFAULT_PORT: u64 = 22;

const METHODS: &[&str] = &[
    "method_comp_cs",
    "method_comp_sc",
    "method_crypt_cs",
    "method_crypt_sc",
    "method_hostkey",
    "method_kex",
    "method_mac_cs",
    "method_mac_sc",
];

pub fn schema() -> Schema {
    METHODS
        .iter()
        .fold(Schema::new(), |schema, name| schema.attr(name, Attribute::string()))
        .attr("port", port().default(DEFAULT_PORT))
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("ssh2.method_comp_cs", "Client to server compression method to offer"),
    ("ssh2.method_comp_sc", "Server to client compression method to offer"),
    ("ssh2.method_crypt_cs", "Client to server cipher to offer"),
    ("ssh2.method_crypt_sc", "Server to client cipher to offer"),
    ("ssh2.method_hostkey", "Host key algorithm to offer"),
    ("ssh2.method_kex", "Key exchange method to offer"),
    ("ssh2.method_mac_cs", "Client to server MAC to offer"),
    ("ssh2.method_mac_sc", "Server to client MAC to offer"),
    ("ssh2.port", "Port of the SSH server"),
];

const FIELDS: &[Field] = &[
    Field::Str("method_comp_cs"),
    Field::Str("method_comp_sc"),
    Field::Str("method_crypt_cs"),
    Field::Str("method_crypt_sc"),
    Field::Str("method_hostkey"),
    Field::Str("method_kex"),
    Field::Str("method_mac_cs"),
    Field::Str("method_mac_sc"),
    Field::Int("port"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

fn methods(ssh: &Ssh2) -> [(&'static str, &Option<String>); 8] {
    [
        ("method_comp_cs", &ssh.method_comp_cs),
        ("method_comp_sc", &ssh.method_comp_sc),
        ("method_crypt_cs", &ssh.method_crypt_cs),
        ("method_crypt_sc", &ssh.method_crypt_sc),
        ("method_hostkey", &ssh.method_hostkey),
        ("method_kex", &ssh.method_kex),
        ("method_mac_cs", &ssh.method_mac_cs),
        ("method_mac_sc", &ssh.method_mac_sc),
    ]
}

pub fn encode(ssh: &Ssh2, bundle: &mut CheckBundle) {
    for (key, value) in methods(ssh) {
        put_opt(&mut bundle.config, key, value.as_ref());
    }
    put(&mut bundle.config, "port", ssh.port.unwrap_or(DEFAULT_PORT));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Ssh2, Error> {
    Ok(Ssh2 {
        method_comp_cs: swamp.take("method_comp_cs"),
        method_comp_sc: swamp.take("method_comp_sc"),
        method_crypt_cs: swamp.take("method_crypt_cs"),
        method_crypt_sc: swamp.take("method_crypt_sc"),
        method_hostkey: swamp.take("method_hostkey"),
        method_kex: swamp.take("method_kex"),
        method_mac_cs: swamp.take("method_mac_cs"),
        method_mac_sc: swamp.take("method_mac_sc"),
        port: swamp.take_parsed("port"),
    })
}
