use crate::{tags, Context, DataSource, Error};
use models::{ids::Entity, CollectorDetail, CollectorInfo};
use schema::{descriptions, Attribute, Kind, ResourceData, Schema, Validator};

pub const NAME: &str = "circonus_collector";

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("details", "Instances of the collector"),
    ("details.cn", "Common name of the instance's certificate"),
    ("details.external_host", "Host by which the instance is reached externally"),
    ("details.external_port", "Port by which the instance is reached externally"),
    ("details.ip", "IP address of the instance"),
    ("details.min_version", "Minimum version the instance must run"),
    ("details.modules", "Check modules the instance supports"),
    ("details.port", "Port of the instance"),
    ("details.skew", "Clock skew of the instance"),
    ("details.status", "Status of the instance"),
    ("details.version", "Version the instance runs"),
    ("id", "CID of the collector"),
    ("latitude", "Latitude of the collector"),
    ("longitude", "Longitude of the collector"),
    ("name", "Name of the collector"),
    ("tags", "Tags of the collector"),
    ("type", "Type of the collector"),
];

pub struct CollectorSource;

pub fn project(wire: &api::Broker, cid: &str) -> CollectorInfo {
    CollectorInfo {
        details: wire
            .details
            .iter()
            .map(|d| CollectorDetail {
                cn: d.cn.clone(),
                external_host: d.external_host.clone(),
                external_port: d.external_port,
                ip: d.ipaddress.clone(),
                min_version: d.minimum_version_required,
                modules: d.modules.clone(),
                port: d.port,
                skew: d.skew.clone(),
                status: d.status.clone(),
                version: d.version,
            })
            .collect(),
        id: wire.cid.clone().unwrap_or_else(|| cid.to_string()),
        latitude: wire.latitude.clone(),
        longitude: wire.longitude.clone(),
        name: wire.name.clone(),
        tags: wire.tags.iter().map(String::as_str).collect(),
        type_: wire.type_.clone(),
    }
}

#[async_trait::async_trait]
impl DataSource for CollectorSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn schema(&self) -> Schema {
        let int = || Attribute::int().computed();
        let string = || Attribute::string().computed();

        let detail = Schema::new()
            .attr("cn", string())
            .attr("external_host", string())
            .attr("external_port", int())
            .attr("ip", string())
            .attr("min_version", int())
            .attr("modules", Attribute::set(Kind::String).computed())
            .attr("port", int())
            .attr("skew", string())
            .attr("status", string())
            .attr("version", int());

        let mut schema = Schema::new()
            .attr("details", Attribute::list(Kind::Block(detail)).computed())
            .attr(
                "id",
                Attribute::string().required().validate(Validator::Cid(Entity::Broker)),
            )
            .attr("latitude", string())
            .attr("longitude", string())
            .attr("name", string())
            .attr("tags", tags::attribute().computed())
            .attr("type", string());

        descriptions::fuse(NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    async fn read(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let violations = schema::validate(data.schema(), data.config());
        if !violations.is_empty() {
            return Err(Error::invalid(violations));
        }
        let cid = data
            .config()
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let wire: api::Broker = ctx.call(NAME, &cid, ctx.client.fetch(&cid)).await?;
        let collector = project(&wire, &cid);

        data.set_id(Some(collector.id.clone()));
        Ok(schema::encode_state(&collector, data)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use schema::MemoryData;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_collector_projection() {
        let transport = Arc::new(api::MemoryTransport::new());
        transport.insert(
            "/broker/1",
            json!({
                "_cid": "/broker/1",
                "_name": "Ashburn, VA, US",
                "_type": "circonus",
                "_tags": ["Region:US-East"],
                "_latitude": "39.043",
                "_details": [{
                    "cn": "mtev_ashburn",
                    "ipaddress": "192.0.2.10",
                    "minimum_version_required": 1504000000,
                    "modules": ["http", "ping_icmp", "dns"],
                    "port": 43191,
                    "status": "active",
                }],
            }),
        );
        let ctx = Context::new(api::Client::new(transport), Default::default());

        let mut data = MemoryData::new(Arc::new(CollectorSource.schema()), &json!({"id": "/broker/1"}));
        CollectorSource.read(&ctx, &mut data).await.unwrap();

        let state = data.state();
        assert_eq!(data.id(), Some("/broker/1"));
        assert_eq!(state["name"], json!("Ashburn, VA, US"));
        assert_eq!(state["tags"], json!(["region:us-east"]));
        assert_eq!(state["details"][0]["ip"], json!("192.0.2.10"));
        assert_eq!(state["details"][0]["min_version"], json!(1504000000));
    }

    #[tokio::test]
    async fn test_platform_errors_propagate() {
        let transport = Arc::new(api::MemoryTransport::new());
        transport.fail_next(500, "internal error");
        let ctx = Context::new(api::Client::new(transport), Default::default());

        let mut data = MemoryData::new(Arc::new(CollectorSource.schema()), &json!({"id": "/broker/1"}));
        let err = CollectorSource.read(&ctx, &mut data).await.unwrap_err();
        assert_eq!(err.to_string(), "circonus_collector \"/broker/1\": API response code 500: internal error");
    }
}
