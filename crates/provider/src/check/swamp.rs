use crate::{error::fault, provider_bug, Error};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Wire keys the platform adds to a check's config, which no variant
/// manages.
pub const ALLOWED_RESIDUE: &[&str] = &["reverse:secret_key", "submission_url"];

/// Swamp is a consumable copy of a check bundle's `config`. Variant
/// decoders take each key they recognize, and whatever remains once
/// they're done is a key the provider failed to manage.
#[derive(Debug)]
pub struct Swamp {
    check_type: String,
    config: BTreeMap<String, String>,
}

impl Swamp {
    pub fn new(check_type: &str, config: &BTreeMap<String, String>) -> Self {
        Self {
            check_type: check_type.to_string(),
            config: config.clone(),
        }
    }

    pub fn take(&mut self, key: &str) -> Option<String> {
        self.config.remove(key)
    }

    /// Take and parse `key`. A value which doesn't parse is a translation
    /// fault: it's logged and treated as absent, so the caller's default
    /// applies and the rest of the decode proceeds.
    pub fn take_parsed<T>(&mut self, key: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.take(key)?;
        match value.trim().parse() {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                fault(format_args!(
                    "{} check has unparseable {key} {value:?}: {err}",
                    self.check_type
                ));
                None
            }
        }
    }

    /// Take a boolean, which is absent or `"false"` when unset.
    /// Legacy `"on"` and `"off"` are also understood.
    pub fn take_bool(&mut self, key: &str) -> bool {
        match self.take(key).as_deref().map(str::trim) {
            None | Some("") => false,
            Some("true") | Some("on") => true,
            Some("false") | Some("off") => false,
            Some(other) => {
                fault(format_args!(
                    "{} check has non-boolean {key} {other:?}",
                    self.check_type
                ));
                false
            }
        }
    }

    /// Take every key beginning with `prefix`, keyed by the remainder.
    pub fn take_prefixed(&mut self, prefix: &str) -> BTreeMap<String, String> {
        let keys: Vec<String> = self
            .config
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();

        keys.into_iter()
            .filter_map(|key| {
                let value = self.config.remove(&key)?;
                Some((key[prefix.len()..].to_string(), value))
            })
            .collect()
    }

    /// Keys which remain.
    pub fn residue(&self) -> impl Iterator<Item = &str> {
        self.config.keys().map(String::as_str)
    }

    /// Complete the decode. Any residue other than keys which the platform
    /// adds on its own is a fatal translation fault.
    pub fn finish(self) -> Result<(), Error> {
        let unmanaged: Vec<&str> = self
            .residue()
            .filter(|k| !ALLOWED_RESIDUE.contains(k))
            .collect();

        if unmanaged.is_empty() {
            Ok(())
        } else {
            Err(provider_bug(format!(
                "{} check config has unmanaged keys: {}",
                self.check_type,
                unmanaged.join(", ")
            )))
        }
    }
}
