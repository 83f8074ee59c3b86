use crate::{Error, Graph, OverlaySet, Transport};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Entity is a platform object with typed CRUD operations.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind of the entity, which is also its collection path.
    const KIND: &'static str;

    fn cid(&self) -> Option<&str>;
    fn set_cid(&mut self, cid: String);

    fn collection() -> String {
        format!("/{}", Self::KIND)
    }
}

/// Client is a typed client of the platform API, shared by every resource
/// of a provider instance.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn fetch<E: Entity>(&self, cid: &str) -> Result<E, Error> {
        let value = self.transport.get(cid).await?;
        decode(cid, value)
    }

    /// Create `entity`, returning it as stored by the platform.
    pub async fn create<E: Entity>(&self, entity: &E) -> Result<E, Error> {
        let collection = E::collection();
        let body = encode(entity)?;
        let value = self.transport.post(&collection, body).await?;
        decode(&collection, value)
    }

    /// Update `entity` in place, returning it as stored by the platform.
    pub async fn update<E: Entity>(&self, entity: &E) -> Result<E, Error> {
        let cid = entity.cid().ok_or(Error::MissingCid { kind: E::KIND })?;
        let body = encode(entity)?;
        let value = self.transport.put(cid, body).await?;
        decode(cid, value)
    }

    pub async fn delete<E: Entity>(&self, cid: &str) -> Result<(), Error> {
        tracing::debug!(kind = E::KIND, %cid, "deleting");
        self.transport.delete(cid).await
    }

    /// Fetch the overlay set `id` of `graph`.
    pub async fn fetch_overlay_set(&self, graph: &str, id: &str) -> Result<OverlaySet, Error> {
        let mut graph: Graph = self.fetch(graph).await?;
        graph
            .overlay_sets
            .remove(id)
            .ok_or_else(|| Error::Status {
                status: 404,
                body: format!("overlay set {id} does not exist"),
            })
    }

    /// Create or replace the overlay set `id` of `graph`.
    pub async fn put_overlay_set(&self, graph: &str, id: &str, set: OverlaySet) -> Result<(), Error> {
        let mut stored: Graph = self.fetch(graph).await?;
        stored.overlay_sets.insert(id.to_string(), set);
        self.update(&stored).await?;
        Ok(())
    }

    /// Remove the overlay set `id` from `graph`.
    pub async fn delete_overlay_set(&self, graph: &str, id: &str) -> Result<(), Error> {
        let mut stored: Graph = self.fetch(graph).await?;
        if stored.overlay_sets.remove(id).is_none() {
            return Err(Error::Status {
                status: 404,
                body: format!("overlay set {id} does not exist"),
            });
        }
        self.update(&stored).await?;
        Ok(())
    }
}

fn encode<E: Entity>(entity: &E) -> Result<serde_json::Value, Error> {
    serde_json::to_value(entity).map_err(|source| Error::Encode {
        kind: E::KIND,
        source,
    })
}

fn decode<E: Entity>(path: &str, value: serde_json::Value) -> Result<E, Error> {
    serde_json::from_value(value).map_err(|source| Error::Decode {
        what: path.to_string(),
        source,
    })
}
