// The schema crate models the attribute tree through which an orchestrator
// configures resources: attribute kinds and validators, normalization of
// configuration and state into canonical form, stable content hashes of
// set elements, and the `ResourceData` accessor over a resource instance.

mod attribute;
mod data;
pub mod descriptions;
pub mod hash;
mod normalize;
pub mod path;
mod validators;

pub use attribute::{Attribute, Kind, Presence, Schema, SetHash, StateFunc};
pub use data::{MemoryData, ResourceData};
pub use normalize::{element_hash, normalize, validate, Mode};
pub use path::Path;
pub use validators::Validator;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} is not an attribute of this resource")]
    UnknownAttribute(String),
    #[error("failed to encode state")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode {what}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode the normalized configuration of `data` into its typed model.
pub fn decode_config<T: serde::de::DeserializeOwned>(
    what: &'static str,
    data: &dyn ResourceData,
) -> Result<T, Error> {
    serde_json::from_value(data.config().clone()).map_err(|source| Error::Decode { what, source })
}

/// Write a typed model as the complete state of `data`.
pub fn encode_state<T: serde::Serialize>(model: &T, data: &mut dyn ResourceData) -> Result<(), Error> {
    let value = serde_json::to_value(model).map_err(Error::Encode)?;
    data.set("", value)
}
