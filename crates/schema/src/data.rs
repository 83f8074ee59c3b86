use crate::{normalize, Error, Mode, Path, Schema};
use serde_json::Value;
use std::sync::Arc;

/// ResourceData is the orchestrator's view of a single resource instance:
/// its user configuration, the provider-written state, and the state prior
/// to the current operation.
pub trait ResourceData: Send + Sync {
    /// Schema of the resource.
    fn schema(&self) -> &Schema;

    /// Primary identifier, if the resource exists.
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: Option<String>);

    /// Normalized user configuration.
    fn config(&self) -> &Value;
    /// Normalized provider state.
    fn state(&self) -> &Value;
    /// State as of the start of the current operation.
    fn prior(&self) -> &Value;

    /// Value at `path`, preferring configuration over state.
    fn get(&self, path: &str) -> Option<&Value> {
        self.get_ok(path).0
    }

    /// Value at `path`, and whether it was set by the user.
    fn get_ok(&self, path: &str) -> (Option<&Value>, bool) {
        let path = Path::parse(path);
        match path.query(self.config()) {
            Some(value) => (Some(value), true),
            None => (path.query(self.state()), false),
        }
    }

    /// Write `value` into state at `path`, normalized against the schema.
    /// The empty path replaces the state root.
    fn set(&mut self, path: &str, value: Value) -> Result<(), Error>;

    /// Whether the configured value at `path` differs from prior state.
    fn has_change(&self, path: &str) -> bool {
        let path = Path::parse(path);
        path.query(self.config()) != path.query(self.prior())
    }
}

/// MemoryData is an in-memory ResourceData, used by tests and the
/// command-line dry run.
#[derive(Debug, Clone)]
pub struct MemoryData {
    schema: Arc<Schema>,
    id: Option<String>,
    config: Value,
    state: Value,
    prior: Value,
}

impl MemoryData {
    /// Build from a raw user configuration document.
    pub fn new(schema: Arc<Schema>, config: &Value) -> Self {
        let config = normalize(&schema, config, Mode::Config);
        Self {
            schema,
            id: None,
            config,
            state: Value::Object(Default::default()),
            prior: Value::Object(Default::default()),
        }
    }

    /// Build for an existing resource, from its identifier and prior state.
    pub fn existing(schema: Arc<Schema>, id: &str, config: &Value, state: &Value) -> Self {
        let mut data = Self::new(schema, config);
        data.id = Some(id.to_string());
        data.state = normalize(&data.schema, state, Mode::State);
        data.prior = data.state.clone();
        data
    }

    /// Begin a new operation: current state becomes prior state.
    pub fn commit(&mut self) {
        self.prior = self.state.clone();
    }

    /// Replace the user configuration.
    pub fn configure(&mut self, config: &Value) {
        self.config = normalize(&self.schema, config, Mode::Config);
    }
}

impl ResourceData for MemoryData {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        if id.is_none() {
            self.state = Value::Object(Default::default());
        }
        self.id = id;
    }

    fn config(&self) -> &Value {
        &self.config
    }

    fn state(&self) -> &Value {
        &self.state
    }

    fn prior(&self) -> &Value {
        &self.prior
    }

    fn set(&mut self, path: &str, value: Value) -> Result<(), Error> {
        let path = Path::parse(path);

        if path.is_root() {
            self.state = normalize(&self.schema, &value, Mode::State);
            return Ok(());
        }
        if self.schema.lookup(&path).is_none() {
            return Err(Error::UnknownAttribute(path.to_string()));
        }

        // Splice the value into a copy of state and re-normalize the whole,
        // so that defaults and set ordering hold at every level.
        let mut next = self.state.clone();
        let slot = path
            .create(&mut next)
            .ok_or_else(|| Error::UnknownAttribute(path.to_string()))?;
        *slot = value;

        self.state = normalize(&self.schema, &next, Mode::State);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Attribute, Kind};
    use serde_json::json;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::new()
                .attr("name", Attribute::string().required())
                .attr("period", Attribute::duration())
                .attr(
                    "if",
                    Attribute::list(Kind::Block(
                        Schema::new().attr(
                            "value",
                            Attribute::block(Schema::new().attr("absent", Attribute::duration())),
                        ),
                    )),
                )
                .attr("check_id", Attribute::string().computed()),
        )
    }

    #[test]
    fn test_get_and_set() {
        let mut data = MemoryData::new(
            schema(),
            &json!({"name": "foo", "if": [{"value": {"absent": "70s"}}]}),
        );

        assert_eq!(data.get("if.0.value.absent"), Some(&json!("70")));
        assert_eq!(data.get_ok("check_id"), (None, false));

        data.set("check_id", json!("/check/1")).unwrap();
        data.set("period", json!("5m")).unwrap();
        assert_eq!(data.get_ok("check_id"), (Some(&json!("/check/1")), false));
        assert_eq!(data.state()["period"], json!("300"));

        data.set("bogus", json!(1)).unwrap_err();

        data.set("", json!({"name": "foo", "if": [{"value": {"absent": 70}}]}))
            .unwrap();
        assert_eq!(data.state()["if"], data.config()["if"]);
    }

    #[test]
    fn test_has_change() {
        let mut data = MemoryData::existing(
            schema(),
            "/rule_set/1_foo",
            &json!({"name": "foo", "period": "2m"}),
            &json!({"name": "foo", "period": 120, "check_id": "/check/1"}),
        );
        assert!(!data.has_change("period"));
        assert!(!data.has_change("name"));

        data.configure(&json!({"name": "bar", "period": "2m"}));
        assert!(data.has_change("name"));

        data.set_id(None);
        assert_eq!(data.id(), None);
        assert_eq!(data.state(), &json!({}));
    }
}
