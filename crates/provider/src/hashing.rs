use schema::hash::Buffer;
use serde_json::Value;
use std::cmp::Ordering;

/// Field is a contributing attribute of a set element's hash.
/// Hashers list their fields in lexical attribute order.
pub enum Field {
    /// A string, or a duration normalized to a string of seconds.
    Str(&'static str),
    /// An integer, which contributes nothing when zero.
    Int(&'static str),
    Float(&'static str),
    Bool(&'static str),
    /// An unordered set of strings.
    Set(&'static str),
    /// An ordered list of strings.
    List(&'static str),
    /// A map of strings, appended in key order.
    Map(&'static str),
    /// A list of nested blocks, sorted by their `key` attribute.
    Blocks {
        name: &'static str,
        key: &'static str,
        fields: &'static [Field],
    },
}

/// Hash the normalized set element `v` over `fields`.
pub fn sum(v: &Value, fields: &[Field]) -> u32 {
    let mut buf = Buffer::new();
    append(&mut buf, v, fields);
    buf.sum()
}

fn append(buf: &mut Buffer, v: &Value, fields: &[Field]) {
    for field in fields {
        match field {
            Field::Str(name) => {
                buf.opt_string(v.get(name).and_then(Value::as_str));
            }
            Field::Int(name) => {
                buf.nonzero_int(v.get(name).and_then(Value::as_i64).unwrap_or_default());
            }
            Field::Float(name) => {
                if let Some(f) = v.get(name).and_then(Value::as_f64) {
                    buf.float(f);
                }
            }
            Field::Bool(name) => {
                buf.bool(v.get(name).and_then(Value::as_bool).unwrap_or_default());
            }
            Field::Set(name) => {
                buf.set(strings(v.get(name)));
            }
            Field::List(name) => {
                buf.list(strings(v.get(name)));
            }
            Field::Map(name) => {
                if let Some(Value::Object(map)) = v.get(name) {
                    for (key, value) in map {
                        buf.string(key).opt_string(value.as_str());
                    }
                }
            }
            Field::Blocks { name, key, fields } => {
                let mut items: Vec<&Value> = match v.get(name) {
                    Some(Value::Array(items)) => items.iter().collect(),
                    _ => Vec::new(),
                };
                items.sort_by(|a, b| compare(a.get(key), b.get(key)));

                for item in items {
                    append(buf, item, fields);
                }
            }
        }
    }
}

fn strings(v: Option<&Value>) -> Vec<&str> {
    match v {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}
