use serde_json::Value;
use xxhash_rust::xxh32::xxh32;

/// Buffer accumulates the canonical content of a sub-block, from which a
/// stable 32-bit identity is derived. Callers append fields in a fixed
/// lexical attribute order.
///
/// * Strings are trimmed, and omitted entirely if empty.
/// * Integers are written as lowercase hex.
/// * Booleans are written as `true` or `false`.
/// * Ordered sequences are appended in order; unordered sets are
///   sorted first.
#[derive(Debug, Default, Clone)]
pub struct Buffer(String);

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(&mut self, s: &str) -> &mut Self {
        self.0.push_str(s.trim());
        self
    }

    pub fn opt_string(&mut self, s: Option<&str>) -> &mut Self {
        if let Some(s) = s {
            self.string(s);
        }
        self
    }

    pub fn int(&mut self, v: i64) -> &mut Self {
        if v < 0 {
            self.0.push('-');
        }
        self.0.push_str(&format!("{:x}", v.unsigned_abs()));
        self
    }

    /// Append `v`, unless it's zero.
    pub fn nonzero_int(&mut self, v: i64) -> &mut Self {
        if v != 0 {
            self.int(v);
        }
        self
    }

    pub fn float(&mut self, v: f64) -> &mut Self {
        self.0.push_str(&v.to_string());
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.0.push_str(if v { "true" } else { "false" });
        self
    }

    pub fn list<'s, I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = &'s str>,
    {
        for item in items {
            self.string(item);
        }
        self
    }

    pub fn set<'s, I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut items: Vec<&str> = items.into_iter().collect();
        items.sort();
        self.list(items)
    }

    /// Append a JSON value in canonical form. Objects append their
    /// properties in key order, and arrays append their items in order.
    pub fn value(&mut self, v: &Value) -> &mut Self {
        match v {
            Value::Null => (),
            Value::Bool(b) => {
                self.bool(*b);
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.int(i);
                } else if let Some(u) = n.as_u64() {
                    self.0.push_str(&format!("{u:x}"));
                } else if let Some(f) = n.as_f64() {
                    self.float(f);
                }
            }
            Value::String(s) => {
                self.string(s);
            }
            Value::Array(arr) => {
                for item in arr {
                    self.value(item);
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    self.string(key);
                    self.value(item);
                }
            }
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn sum(&self) -> u32 {
        xxh32(self.0.as_bytes(), 0)
    }
}

/// Hash of a JSON value in canonical form, used as the identity of set
/// elements which don't declare a hasher of their own.
pub fn of_value(v: &Value) -> u32 {
    let mut buf = Buffer::new();
    buf.value(v);
    buf.sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_buffer_encoding() {
        let mut buf = Buffer::new();
        buf.string("  rtt ")
            .string("")
            .int(255)
            .nonzero_int(0)
            .int(-16)
            .bool(true)
            .set(["b", "a"])
            .list(["d", "c"]);

        assert_eq!(buf.as_str(), "rttff-10trueabdc");
    }

    #[test]
    fn test_stable_sum() {
        let mut a = Buffer::new();
        a.string("rtt").string("numeric").bool(true);
        let mut b = Buffer::new();
        b.string(" rtt").string("numeric ").bool(true);

        assert_eq!(a.sum(), b.sum());
        assert_eq!(Buffer::new().sum(), xxh32(b"", 0));
        assert_eq!(Buffer::new().sum(), 0x02cc5d05);
    }

    #[test]
    fn test_set_order_is_irrelevant() {
        let mut a = Buffer::new();
        a.set(["author:terraform", "env:prod"]);
        let mut b = Buffer::new();
        b.set(["env:prod", "author:terraform"]);
        assert_eq!(a.sum(), b.sum());

        assert_eq!(
            of_value(&json!({"b": 1, "a": "x"})),
            of_value(&json!({"a": "x", "b": 1}))
        );
        assert_ne!(of_value(&json!(["x", "y"])), of_value(&json!(["y", "x"])));
    }
}
