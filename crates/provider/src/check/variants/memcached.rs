use super::{port, put, Swamp};
use crate::{
    error::fault,
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::Memcached;
use schema::Schema;
use serde_json::Value;

pub const DEFAULT_PORT: u64 = 11211;

pub fn schema() -> Schema {
    Schema::new().attr("port", port().default(DEFAULT_PORT))
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[("memcached.port", "Port of the memcached server")];

const FIELDS: &[Field] = &[Field::Int("port")];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(memcached: &Memcached, bundle: &mut CheckBundle) {
    put(&mut bundle.config, "port", memcached.port.unwrap_or(DEFAULT_PORT));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<Memcached, Error> {
    let port = match swamp.take_parsed("port") {
        Some(port) => port,
        None => {
            fault(format_args!("memcached check has no port, assuming {DEFAULT_PORT}"));
            DEFAULT_PORT
        }
    };
    Ok(Memcached { port: Some(port) })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    #[tracing_test::traced_test]
    #[test]
    fn test_missing_port_defaults() {
        let bundle = CheckBundle::default();
        let mut swamp = Swamp::new("memcached", &BTreeMap::new());

        let memcached = decode(&bundle, &mut swamp).unwrap();
        assert_eq!(memcached.port, Some(DEFAULT_PORT));
        assert!(logs_contain("PROVIDER BUG: memcached check has no port, assuming 11211"));
        swamp.finish().unwrap();
    }
}
