use crate::{hash, Attribute, Kind, Path, Presence, Schema};
use models::{Seconds, Violation};
use serde_json::{Map, Number, Value};

/// Mode of normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// User configuration: computed-only attributes are dropped.
    Config,
    /// Provider state: computed attributes are retained.
    State,
}

/// Normalize a document against its schema into canonical form:
///
/// * Defaults are filled for absent attributes.
/// * Scalars are coerced to their kind, and durations become a string of
///   integer seconds.
/// * Nulls, empty collections, and zero values of attributes without a
///   default are dropped, as they're indistinguishable from "unset".
/// * Strings pass through the attribute's `StateFunc`, if it has one.
/// * Set elements are de-duplicated and ordered by their hash.
///
/// Values which cannot be coerced are passed through untouched, for
/// `validate` to report.
pub fn normalize(schema: &Schema, doc: &Value, mode: Mode) -> Value {
    match doc {
        Value::Object(map) => Value::Object(normalize_block(schema, map, mode)),
        _ => Value::Object(normalize_block(schema, &Map::new(), mode)),
    }
}

fn normalize_block(schema: &Schema, map: &Map<String, Value>, mode: Mode) -> Map<String, Value> {
    let mut out = Map::new();

    for (name, attr) in schema.iter() {
        if mode == Mode::Config && !attr.presence.is_configurable() {
            continue;
        }
        let value = match map.get(name) {
            Some(value) if !value.is_null() => Some(normalize_value(attr, &attr.kind, value, mode)),
            _ => attr.default.clone(),
        };
        let Some(value) = value else { continue };

        if attr.default.is_none() && is_empty(&attr.kind, &value) {
            continue;
        }
        out.insert(name.to_string(), value);
    }
    // Unknown attributes pass through, for validation to reject.
    for (name, value) in map {
        if schema.get(name).is_none() {
            out.insert(name.clone(), value.clone());
        }
    }
    out
}

fn normalize_value(attr: &Attribute, kind: &Kind, value: &Value, mode: Mode) -> Value {
    match (kind, value) {
        (Kind::Bool, Value::String(s)) => match s.trim() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => value.clone(),
        },
        (Kind::Int, Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(_), _) => value.clone(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Value::from(f as i64)
            }
            _ => value.clone(),
        },
        (Kind::Int, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => value.clone(),
        },
        (Kind::Float, Value::Number(n)) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        (Kind::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        (Kind::String, Value::String(s)) => match attr.state_func {
            Some(func) => Value::String(func(s)),
            None => value.clone(),
        },
        (Kind::String, Value::Number(n)) => Value::String(n.to_string()),
        (Kind::String, Value::Bool(b)) => Value::String(b.to_string()),
        (Kind::Duration, Value::String(s)) => match Seconds::parse(s) {
            Ok(secs) => Value::String(secs.to_string()),
            Err(_) => value.clone(),
        },
        (Kind::Duration, Value::Number(n)) => match (n.as_u64(), n.as_f64()) {
            (Some(u), _) => Value::String(u.to_string()),
            (None, Some(f)) if f >= 0.0 => Value::String((f as u64).to_string()),
            _ => value.clone(),
        },
        (Kind::Block(inner), Value::Object(map)) => Value::Object(normalize_block(inner, map, mode)),
        (Kind::List(of), Value::Array(items)) => Value::Array(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| normalize_value(attr, of, item, mode))
                .collect(),
        ),
        (Kind::Set(of), Value::Array(items)) => {
            let mut keyed: Vec<(u32, Value)> = items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| {
                    let item = normalize_value(attr, of, item, mode);
                    (element_hash(attr, &item), item)
                })
                .collect();

            keyed.sort_by_key(|(h, _)| *h);
            keyed.dedup_by_key(|(h, _)| *h);
            Value::Array(keyed.into_iter().map(|(_, item)| item).collect())
        }
        (Kind::Map(of), Value::Object(map)) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), normalize_value(attr, of, v, mode)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Hash of a normalized set element, using the attribute's declared hasher
/// if it has one.
pub fn element_hash(attr: &Attribute, item: &Value) -> u32 {
    match attr.set_hash {
        Some(hasher) => hasher(item),
        None => hash::of_value(item),
    }
}

fn is_empty(kind: &Kind, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) if matches!(kind, Kind::Duration) => s.is_empty() || s == "0",
        Value::String(s) => s.is_empty(),
        Value::Array(arr) => arr.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Validate a normalized document against its schema, returning every
/// violation found.
pub fn validate(schema: &Schema, doc: &Value) -> Vec<Violation> {
    let mut out = Vec::new();
    match doc {
        Value::Object(map) => validate_block(schema, map, &Path::root(), &mut out),
        _ => out.push(Violation::new("", "expected an object")),
    }
    out
}

fn validate_block(schema: &Schema, map: &Map<String, Value>, path: &Path, out: &mut Vec<Violation>) {
    for (name, attr) in schema.iter() {
        let at = path.prop(name);

        match map.get(name) {
            None if attr.presence == Presence::Required => {
                out.push(Violation::new(at.to_string(), "attribute is required"));
            }
            None => (),
            Some(value) => {
                for other in &attr.conflicts_with {
                    if map.contains_key(other) {
                        out.push(Violation::new(
                            at.to_string(),
                            format!("conflicts with {other}"),
                        ));
                    }
                }
                validate_value(attr, &attr.kind, value, &at, out);
            }
        }
    }
    for group in &schema.exactly_one_of {
        let set: Vec<&str> = group
            .iter()
            .filter(|n| map.contains_key(n.as_str()))
            .map(String::as_str)
            .collect();

        if set.len() != 1 {
            let at = if path.is_root() { group.join(",") } else { path.to_string() };
            out.push(Violation::new(
                at,
                format!(
                    "exactly one of {} must be set (found {})",
                    group.join(", "),
                    if set.is_empty() { "none".to_string() } else { set.join(", ") },
                ),
            ));
        }
    }
    for name in map.keys() {
        if schema.get(name).is_none() {
            out.push(Violation::new(path.prop(name).to_string(), "unknown attribute"));
        }
    }
}

fn validate_value(attr: &Attribute, kind: &Kind, value: &Value, path: &Path, out: &mut Vec<Violation>) {
    let mismatch = |expect: &str| Violation::new(path.to_string(), format!("expected {expect}, not {value}"));

    match (kind, value) {
        (Kind::Bool, Value::Bool(_)) => (),
        (Kind::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => (),
        (Kind::Float, Value::Number(_)) => (),
        (Kind::String, Value::String(_)) => (),
        (Kind::Duration, Value::String(s)) if s.parse::<u64>().is_ok() => (),
        (Kind::Block(inner), Value::Object(map)) => {
            return validate_block(inner, map, path, out);
        }
        (Kind::List(of) | Kind::Set(of), Value::Array(items)) => {
            if let Some(max) = attr.max_items {
                if items.len() > max {
                    out.push(Violation::new(
                        path.to_string(),
                        format!("at most {max} items are allowed, not {}", items.len()),
                    ));
                }
            }
            if let Some(min) = attr.min_items {
                if items.len() < min {
                    out.push(Violation::new(
                        path.to_string(),
                        format!("at least {min} items are required, not {}", items.len()),
                    ));
                }
            }
            for (index, item) in items.iter().enumerate() {
                validate_value(attr, of, item, &path.index(index), out);
            }
            return;
        }
        (Kind::Map(of), Value::Object(map)) => {
            for (key, item) in map {
                validate_value(attr, of, item, &path.prop(key), out);
            }
            return;
        }
        (Kind::Bool, _) => return out.push(mismatch("a bool")),
        (Kind::Int, _) => return out.push(mismatch("an integer")),
        (Kind::Float, _) => return out.push(mismatch("a number")),
        (Kind::String, _) => return out.push(mismatch("a string")),
        (Kind::Duration, _) => return out.push(mismatch("a duration")),
        (Kind::Block(_) | Kind::Map(_), _) => return out.push(mismatch("an object")),
        (Kind::List(_) | Kind::Set(_), _) => return out.push(mismatch("a list")),
    }

    for validator in &attr.validators {
        if let Err(rule) = validator.check(value) {
            out.push(Violation::new(path.to_string(), rule));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Validator;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixture() -> Schema {
        Schema::new()
            .attr("active", Attribute::bool().default(true))
            .attr("name", Attribute::string().required())
            .attr("period", Attribute::duration())
            .attr("port", Attribute::int().validate(Validator::IntRange { min: 1, max: 65535 }))
            .attr("timeout", Attribute::float())
            .attr("tags", Attribute::set(Kind::String).validate(Validator::Tag))
            .attr("headers", Attribute::map(Kind::String))
            .attr("check_id", Attribute::string().computed())
            .attr(
                "over",
                Attribute::block(
                    Schema::new()
                        .attr("last", Attribute::duration().required())
                        .attr("using", Attribute::string().default("average")),
                ),
            )
            .attr("metric_name", Attribute::string().conflicts_with(&["metric_pattern"]))
            .attr("metric_pattern", Attribute::string())
            .exactly_one_of(&["metric_name", "metric_pattern"])
    }

    #[test]
    fn test_normalization() {
        let doc = json!({
            "name": "foo",
            "period": "2m",
            "port": "8080",
            "timeout": 10,
            "tags": ["b:2", "a:1", "b:2", null],
            "headers": {},
            "check_id": "/check/1",
            "over": {"last": 300},
            "metric_name": "",
            "metric_pattern": "^cpu",
            "unknown": 1,
        });

        let config = normalize(&fixture(), &doc, Mode::Config);
        assert_eq!(config["active"], json!(true));
        assert_eq!(config["period"], json!("120"));
        assert_eq!(config["port"], json!(8080));
        assert_eq!(config["timeout"], json!(10.0));
        assert_eq!(config["tags"].as_array().unwrap().len(), 2);
        assert_eq!(config["over"], json!({"last": "300", "using": "average"}));
        assert_eq!(config["unknown"], json!(1));
        assert!(config.get("headers").is_none());
        assert!(config.get("check_id").is_none());
        assert!(config.get("metric_name").is_none());

        let state = normalize(&fixture(), &doc, Mode::State);
        assert_eq!(state["check_id"], json!("/check/1"));
    }

    #[test]
    fn test_equivalent_documents_normalize_equally() {
        let a = normalize(
            &fixture(),
            &json!({"name": "foo", "period": 120, "tags": ["x:1", "y:2"], "active": true}),
            Mode::Config,
        );
        let b = normalize(
            &fixture(),
            &json!({"name": "foo", "period": "2m", "tags": ["y:2", "x:1"], "timeout": 0}),
            Mode::Config,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_state_func() {
        let schema = Schema::new().attr(
            "tags",
            Attribute::set(Kind::String).state_func(|s| s.trim().to_lowercase()),
        );
        let doc = normalize(&schema, &json!({"tags": ["App:RDS", " app:rds"]}), Mode::Config);
        assert_eq!(doc, json!({"tags": ["app:rds"]}));
    }

    #[test]
    fn test_validation() {
        let doc = normalize(
            &fixture(),
            &json!({
                "period": "soon",
                "port": 70000,
                "tags": ["bad tag"],
                "over": {"using": "max"},
                "metric_name": "cpu",
                "metric_pattern": "^cpu",
                "unknown": 1,
            }),
            Mode::Config,
        );

        let violations: Vec<String> = validate(&fixture(), &doc)
            .into_iter()
            .map(|v| v.to_string())
            .collect();

        assert_eq!(
            violations,
            vec![
                "metric_name: conflicts with metric_pattern",
                "name: attribute is required",
                "over.last: attribute is required",
                "period: expected a duration, not \"soon\"",
                "port: 70000 is not within 1-65535",
                "tags.0: \"bad tag\" is not a valid tag",
                "metric_name,metric_pattern: exactly one of metric_name, metric_pattern must be set (found metric_name, metric_pattern)",
                "unknown: unknown attribute",
            ]
        );
    }
}
