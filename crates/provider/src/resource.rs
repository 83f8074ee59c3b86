use crate::{Context, Error, Meta};
use models::{ids::decode_import_id, Violation};
use schema::{ResourceData, Schema};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// Resource is a managed resource type, and its lifecycle operations.
/// Each operation acts on a single resource instance through its
/// `ResourceData`, and platform calls are made in program order.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    fn name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Validate the configuration and translate it to its wire form,
    /// without calling the platform.
    fn encode(&self, meta: &Meta, data: &dyn ResourceData) -> Result<Value, Error>;

    async fn create(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error>;

    /// Refresh state from the platform. A resource which no longer exists
    /// has its identifier cleared.
    async fn read(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error>;

    async fn update(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error>;

    async fn delete(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error>;

    async fn exists(&self, ctx: &Context, data: &dyn ResourceData) -> Result<bool, Error>;

    /// Adopt the existing platform object `id`, which may be
    /// percent-encoded.
    async fn import(&self, ctx: &Context, id: &str, data: &mut dyn ResourceData) -> Result<(), Error> {
        let id = decode_import_id(id);
        data.set_id(Some(id.clone()));
        self.read(ctx, data).await?;

        if data.id().is_none() {
            return Err(Error::Missing {
                entity: self.name(),
                id,
            });
        }
        Ok(())
    }
}

/// DataSource is a read-only lookup of a platform object.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error>;
}

/// Translator maps the typed model of a resource to and from the wire
/// entity which the platform persists.
pub trait Translator: Send + Sync + 'static {
    const NAME: &'static str;
    /// Fetch the stored entity before an update, to `carry_over` state
    /// which the resource doesn't manage.
    const FETCH_BEFORE_UPDATE: bool = false;

    type Model: Serialize + DeserializeOwned + Send + Sync;
    type Wire: api::Entity + Clone;

    fn schema() -> Schema;

    /// Validation across attributes, beyond what the schema expresses.
    fn validate(_model: &Self::Model) -> Vec<Violation> {
        Vec::new()
    }

    fn encode(model: &Self::Model, meta: &Meta) -> Result<Self::Wire, Error>;

    fn decode(wire: &Self::Wire, meta: &Meta) -> Result<Self::Model, Error>;

    /// Read the model from the resource's configuration.
    fn load(data: &dyn ResourceData) -> Result<Self::Model, Error> {
        Ok(schema::decode_config(Self::NAME, data)?)
    }

    /// Write the model as the resource's state.
    fn store(model: &Self::Model, data: &mut dyn ResourceData) -> Result<(), Error> {
        Ok(schema::encode_state(model, data)?)
    }

    fn carry_over(_next: &mut Self::Wire, _stored: Self::Wire) {}
}

/// Managed is the Resource of a Translator whose entity is persisted
/// through the platform's generic CRUD.
pub struct Managed<T>(PhantomData<T>);

impl<T: Translator> Managed<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Translator> Default for Managed<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate the configuration of `data`, and encode its wire entity.
fn prepare<T: Translator>(meta: &Meta, data: &dyn ResourceData) -> Result<T::Wire, Error> {
    let violations = schema::validate(data.schema(), data.config());
    if !violations.is_empty() {
        return Err(Error::invalid(violations));
    }
    let model = T::load(data)?;

    let violations = T::validate(&model);
    if !violations.is_empty() {
        return Err(Error::invalid(violations));
    }
    T::encode(&model, meta)
}

fn store<T: Translator>(meta: &Meta, wire: &T::Wire, data: &mut dyn ResourceData) -> Result<(), Error> {
    let model = T::decode(wire, meta)?;
    T::store(&model, data)
}

fn required_id(entity: &'static str, data: &dyn ResourceData) -> Result<String, Error> {
    data.id()
        .map(str::to_string)
        .ok_or_else(|| Error::Translation(format!("{entity} has no identifier")))
}

#[async_trait::async_trait]
impl<T: Translator> Resource for Managed<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn schema(&self) -> Schema {
        T::schema()
    }

    fn encode(&self, meta: &Meta, data: &dyn ResourceData) -> Result<Value, Error> {
        let wire = prepare::<T>(meta, data)?;
        serde_json::to_value(&wire).map_err(|err| Error::Translation(err.to_string()))
    }

    async fn create(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let wire = prepare::<T>(&ctx.meta, data)?;
        let created = ctx.call(T::NAME, "", ctx.client.create(&wire)).await?;

        let cid = match api::Entity::cid(&created) {
            Some(cid) if !cid.is_empty() => cid.to_string(),
            _ => return Err(crate::provider_bug(format!("created {} has no CID", T::NAME))),
        };
        tracing::info!(resource = T::NAME, %cid, "created");

        data.set_id(Some(cid));
        store::<T>(&ctx.meta, &created, data)
    }

    async fn read(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let cid = required_id(T::NAME, data)?;

        match ctx.call(T::NAME, &cid, ctx.client.fetch::<T::Wire>(&cid)).await {
            Ok(wire) => store::<T>(&ctx.meta, &wire, data),
            Err(err) if err.is_not_found() => {
                tracing::warn!(resource = T::NAME, %cid, "resource no longer exists");
                data.set_id(None);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn update(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let cid = required_id(T::NAME, data)?;
        let mut wire = prepare::<T>(&ctx.meta, data)?;
        api::Entity::set_cid(&mut wire, cid.clone());

        if T::FETCH_BEFORE_UPDATE {
            let stored = ctx.call(T::NAME, &cid, ctx.client.fetch::<T::Wire>(&cid)).await?;
            T::carry_over(&mut wire, stored);
        }
        let updated = ctx.call(T::NAME, &cid, ctx.client.update(&wire)).await?;
        tracing::info!(resource = T::NAME, %cid, "updated");

        store::<T>(&ctx.meta, &updated, data)
    }

    async fn delete(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let cid = required_id(T::NAME, data)?;

        match ctx.call(T::NAME, &cid, ctx.client.delete::<T::Wire>(&cid)).await {
            Ok(()) => (),
            Err(err) if err.is_not_found() => {
                tracing::warn!(resource = T::NAME, %cid, "resource was already deleted");
            }
            Err(err) => return Err(err),
        }
        data.set_id(None);
        Ok(())
    }

    async fn exists(&self, ctx: &Context, data: &dyn ResourceData) -> Result<bool, Error> {
        let Some(cid) = data.id() else {
            return Ok(false);
        };

        match ctx.call(T::NAME, cid, ctx.client.fetch::<T::Wire>(cid)).await {
            Ok(wire) => Ok(api::Entity::cid(&wire).map_or(false, |c| !c.is_empty())),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
