use crate::{Error, Transport};
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// Timestamp stamped onto entities created by a MemoryTransport.
pub const MEMORY_EPOCH: u64 = 1_500_000_000;

/// MemoryTransport is an in-process fake of the platform API, which
/// assigns CIDs and computed attributes the way the platform does.
#[derive(Default)]
pub struct MemoryTransport {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    entities: BTreeMap<String, Value>,
    failures: VecDeque<(u16, String)>,
    next_id: u64,
    requests: Vec<Request>,
}

/// Request is a call recorded by a MemoryTransport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entity at `cid`.
    pub fn insert(&self, cid: &str, value: Value) {
        self.lock().entities.insert(cid.to_string(), value);
    }

    pub fn entity(&self, cid: &str) -> Option<Value> {
        self.lock().entities.get(cid).cloned()
    }

    /// Every request made so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    /// Fail the next request with the given status and body.
    pub fn fail_next(&self, status: u16, body: &str) {
        self.lock().failures.push_back((status, body.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panicking test may poison the lock; its state remains usable.
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    fn begin(&self, method: &'static str, path: &str, body: Option<&Value>) -> Result<(), Error> {
        let mut inner = self.lock();
        inner.requests.push(Request {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
        match inner.failures.pop_front() {
            Some((status, body)) => Err(Error::Status { status, body }),
            None => Ok(()),
        }
    }
}

fn not_found(path: &str) -> Error {
    Error::Status {
        status: 404,
        body: json!({"code": "ObjectNotFound", "explanation": format!("{path} does not exist")})
            .to_string(),
    }
}

impl Inner {
    fn assign_cid(&mut self, kind: &str, body: &Value) -> String {
        self.next_id += 1;
        let id = 1000 + self.next_id;

        if kind == "rule_set" {
            let check = body["check"].as_str().unwrap_or_default();
            let check_id = check.rsplit('/').next().unwrap_or_default();
            let metric = body["metric_name"]
                .as_str()
                .or_else(|| body["metric_pattern"].as_str())
                .unwrap_or_default();
            return format!("/rule_set/{check_id}_{metric}");
        }
        format!("/{kind}/{id}")
    }
}

/// Stamp the computed attributes which the platform adds to a new entity.
fn stamp_computed(kind: &str, cid: &str, body: &mut Value) {
    let Some(map) = body.as_object_mut() else {
        return;
    };
    let id = cid.rsplit('/').next().unwrap_or_default().to_string();
    map.insert("_cid".to_string(), json!(cid));

    match kind {
        "check_bundle" => {
            let brokers = map
                .get("brokers")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or_default();
            let checks: Vec<String> = (0..brokers).map(|i| format!("/check/{id}{i}")).collect();
            let uuids: Vec<String> = (0..brokers)
                .map(|i| format!("00000000-0000-4000-8000-{id:0>8}{i:0>4}"))
                .collect();
            map.insert("_checks".to_string(), json!(checks));
            map.insert("_check_uuids".to_string(), json!(uuids));
            map.insert("_created".to_string(), json!(MEMORY_EPOCH));
            map.insert("_last_modified".to_string(), json!(MEMORY_EPOCH));
            map.insert("_last_modified_by".to_string(), json!("/user/1"));
        }
        "contact_group" => {
            map.insert("_last_modified".to_string(), json!(MEMORY_EPOCH));
            map.insert("_last_modified_by".to_string(), json!("/user/1"));
        }
        "dashboard" => {
            map.insert("_created".to_string(), json!(MEMORY_EPOCH));
            map.insert("_last_modified".to_string(), json!(MEMORY_EPOCH));
            map.insert(
                "_dashboard_uuid".to_string(),
                json!(format!("00000000-0000-4000-8000-{id:0>12}")),
            );
        }
        _ => (),
    }
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, path: &str) -> Result<Value, Error> {
        self.begin("GET", path, None)?;
        self.lock()
            .entities
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    async fn post(&self, path: &str, mut body: Value) -> Result<Value, Error> {
        self.begin("POST", path, Some(&body))?;
        let kind = path.trim_matches('/');

        let mut inner = self.lock();
        let cid = inner.assign_cid(kind, &body);
        stamp_computed(kind, &cid, &mut body);
        inner.entities.insert(cid, body.clone());
        Ok(body)
    }

    async fn put(&self, path: &str, mut body: Value) -> Result<Value, Error> {
        self.begin("PUT", path, Some(&body))?;

        let mut inner = self.lock();
        let Some(existing) = inner.entities.get(path) else {
            return Err(not_found(path));
        };
        // Computed attributes are retained across updates.
        if let (Some(existing), Some(update)) = (existing.as_object(), body.as_object_mut()) {
            for (key, value) in existing {
                if key.starts_with('_') && !update.contains_key(key) {
                    update.insert(key.clone(), value.clone());
                }
            }
        }
        inner.entities.insert(path.to_string(), body.clone());
        Ok(body)
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        self.begin("DELETE", path, None)?;
        match self.lock().entities.remove(path) {
            Some(_) => Ok(()),
            None => Err(not_found(path)),
        }
    }
}
