//! Metrics are described on the client only: the platform never persists
//! them, and checks reference them by value. The resource exists so that a
//! metric can be declared once and shared by several checks.

use crate::{tags, Context, Error, Meta, Resource};
use models::{Metric, MetricType};
use schema::{descriptions, Attribute, ResourceData, Schema, Validator};
use serde_json::Value;

pub const NAME: &str = "circonus_metric";

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("active", "Whether the metric is collected"),
    ("name", "Name of the metric"),
    ("tags", "Tags of the metric"),
    ("type", "Type of the metric"),
    ("unit", "Unit of the metric's values"),
];

pub struct MetricResource;

fn load(data: &dyn ResourceData) -> Result<Metric, Error> {
    let violations = schema::validate(data.schema(), data.config());
    if !violations.is_empty() {
        return Err(Error::invalid(violations));
    }
    Ok(schema::decode_config(NAME, data)?)
}

#[async_trait::async_trait]
impl Resource for MetricResource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::new()
            .attr("active", Attribute::bool().default(true))
            .attr("name", Attribute::string().required())
            .attr("tags", tags::attribute())
            .attr(
                "type",
                Attribute::string().required().validate(Validator::OneOf(MetricType::ALL)),
            )
            .attr("unit", Attribute::string());

        descriptions::fuse(NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn encode(&self, _meta: &Meta, data: &dyn ResourceData) -> Result<Value, Error> {
        let metric = load(data)?;
        serde_json::to_value(&metric).map_err(|err| Error::Translation(err.to_string()))
    }

    async fn create(&self, _ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let metric = load(data)?;
        if data.id().is_none() {
            let id = uuid::Uuid::new_v4().to_string();
            tracing::debug!(resource = NAME, %id, "assigned metric id");
            data.set_id(Some(id));
        }
        Ok(schema::encode_state(&metric, data)?)
    }

    async fn read(&self, _ctx: &Context, _data: &mut dyn ResourceData) -> Result<(), Error> {
        Ok(())
    }

    async fn update(&self, _ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let metric = load(data)?;
        Ok(schema::encode_state(&metric, data)?)
    }

    async fn delete(&self, _ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        data.set_id(None);
        Ok(())
    }

    async fn exists(&self, _ctx: &Context, data: &dyn ResourceData) -> Result<bool, Error> {
        Ok(data.id().is_some())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use schema::MemoryData;
    use serde_json::json;
    use std::sync::Arc;

    fn context() -> (Context, Arc<api::MemoryTransport>) {
        let transport = Arc::new(api::MemoryTransport::new());
        let client = api::Client::new(transport.clone());
        (Context::new(client, Meta::default()), transport)
    }

    #[tokio::test]
    async fn test_lifecycle_is_local() {
        let (ctx, transport) = context();
        let schema = Arc::new(MetricResource.schema());
        let mut data = MemoryData::new(
            schema,
            &json!({"name": "rtt", "type": "numeric", "unit": "seconds", "tags": ["Source:Ping"]}),
        );

        MetricResource.create(&ctx, &mut data).await.unwrap();
        let id = data.id().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_eq!(data.state()["active"], json!(true));
        assert_eq!(data.state()["tags"], json!(["source:ping"]));

        data.configure(&json!({"name": "rtt", "type": "numeric", "active": false}));
        MetricResource.update(&ctx, &mut data).await.unwrap();
        assert_eq!(data.id(), Some(id.as_str()));
        assert!(data.state().get("unit").is_none());

        assert!(MetricResource.exists(&ctx, &data).await.unwrap());
        MetricResource.delete(&ctx, &mut data).await.unwrap();
        assert!(!MetricResource.exists(&ctx, &data).await.unwrap());

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let (ctx, _) = context();
        let mut data = MemoryData::new(
            Arc::new(MetricResource.schema()),
            &json!({"name": "rtt", "type": "gauge"}),
        );
        let err = MetricResource.create(&ctx, &mut data).await.unwrap_err();
        assert!(err.to_string().starts_with("type: "));
        assert_eq!(data.id(), None);
    }
}
