use serde::{Deserialize, Serialize};

/// Broker is a collector which runs checks. Brokers are read-only.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Broker {
    #[serde(rename = "_cid")]
    pub cid: Option<String>,
    #[serde(rename = "_details")]
    pub details: Vec<BrokerDetail>,
    #[serde(rename = "_latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "_longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "_name")]
    pub name: String,
    #[serde(rename = "_tags")]
    pub tags: Vec<String>,
    #[serde(rename = "_type")]
    pub type_: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BrokerDetail {
    pub cn: String,
    pub external_host: Option<String>,
    pub external_port: Option<u64>,
    pub ipaddress: Option<String>,
    pub minimum_version_required: Option<u64>,
    pub modules: Vec<String>,
    pub port: Option<u64>,
    pub skew: Option<String>,
    pub status: String,
    pub version: Option<u64>,
}

impl crate::Entity for Broker {
    const KIND: &'static str = "broker";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
