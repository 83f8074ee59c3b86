use serde_json::Value;

/// Token is a parsed component of a dotted attribute path.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Token {
    /// Index of a list or set element.
    Index(usize),
    /// Attribute or map key name. Never an integer.
    Property(String),
}

impl Token {
    fn parse(s: &str) -> Self {
        if s.starts_with('+') || (s.starts_with('0') && s.len() > 1) {
            Token::Property(s.to_string())
        } else if let Ok(ind) = s.parse::<usize>() {
            Token::Index(ind)
        } else {
            Token::Property(s.to_string())
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Index(ind) => write!(f, "{ind}"),
            Token::Property(prop) => write!(f, "{prop}"),
        }
    }
}

/// Path addresses a location within a resource's attribute tree,
/// such as `if.0.value.absent`. The empty path is the resource root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path(pub Vec<Token>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        Path(s.split('.').map(Token::parse).collect())
    }

    pub fn push(&self, token: Token) -> Self {
        let mut next = self.clone();
        next.0.push(token);
        next
    }

    pub fn prop(&self, name: &str) -> Self {
        self.push(Token::Property(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.push(Token::Index(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.0.iter()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Query an existing value at the path location within the document.
    /// Returns None if the location (or a parent thereof) does not exist.
    pub fn query<'v>(&self, mut value: &'v Value) -> Option<&'v Value> {
        for token in self.iter() {
            value = match (value, token) {
                (Value::Object(map), Token::Property(prop)) => map.get(prop)?,
                (Value::Object(map), Token::Index(ind)) => map.get(&ind.to_string())?,
                (Value::Array(arr), Token::Index(ind)) => arr.get(*ind)?,
                _ => return None,
            };
        }
        Some(value)
    }

    /// Query a mutable value at the path location, creating it if it doesn't
    /// exist. Null parents are instantiated as objects or arrays depending on
    /// the token type, and arrays are extended with nulls as required.
    /// Returns None only if the document structure is incompatible with the
    /// path, such as when a parent location is a scalar.
    pub fn create<'v>(&self, value: &'v mut Value) -> Option<&'v mut Value> {
        let mut v = value;

        for token in self.iter() {
            if v.is_null() {
                *v = match token {
                    Token::Property(_) => Value::Object(Default::default()),
                    Token::Index(_) => Value::Array(Vec::new()),
                };
            }

            v = match (v, token) {
                (Value::Object(map), Token::Property(prop)) => {
                    map.entry(prop.clone()).or_insert(Value::Null)
                }
                (Value::Object(map), Token::Index(ind)) => {
                    map.entry(ind.to_string()).or_insert(Value::Null)
                }
                (Value::Array(arr), Token::Index(ind)) => {
                    if *ind >= arr.len() {
                        arr.resize(ind + 1, Value::Null);
                    }
                    &mut arr[*ind]
                }
                _ => return None,
            };
        }
        Some(v)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(".")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_display() {
        let path = Path::parse("if.0.value.absent");
        assert_eq!(
            path.0,
            vec![
                Token::Property("if".to_string()),
                Token::Index(0),
                Token::Property("value".to_string()),
                Token::Property("absent".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "if.0.value.absent");
        assert_eq!(Path::parse("").to_string(), "");
        assert_eq!(Path::parse("01").0, vec![Token::Property("01".to_string())]);
    }

    #[test]
    fn test_query() {
        let doc = json!({"if": [{"value": {"absent": "70"}}], "tags": {"1": "x"}});

        for (case, expect) in [
            ("if.0.value.absent", Some(json!("70"))),
            ("if.1.value", None),
            ("tags.1", Some(json!("x"))),
            ("if.0.value.absent.deeper", None),
            ("", Some(doc.clone())),
        ] {
            assert_eq!(Path::parse(case).query(&doc).cloned(), expect, "{case}");
        }
    }

    #[test]
    fn test_create() {
        let mut doc = Value::Null;
        *Path::parse("if.1.then.severity").create(&mut doc).unwrap() = json!(2);
        assert_eq!(doc, json!({"if": [null, {"then": {"severity": 2}}]}));

        let mut scalar = json!({"name": "foo"});
        assert!(Path::parse("name.inner").create(&mut scalar).is_none());
    }
}
