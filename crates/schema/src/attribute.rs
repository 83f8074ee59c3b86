use crate::Validator;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Kind is the shape of an attribute's value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum Kind {
    Bool,
    Int,
    Float,
    String,
    /// Durations accept plain or annotated seconds (`120`, `"2m"`), and
    /// normalize to a string of integer seconds.
    Duration,
    /// A single nested block of attributes.
    Block(Schema),
    /// An ordered list of elements.
    List(Box<Kind>),
    /// An unordered set of elements, identified by their hash.
    Set(Box<Kind>),
    /// A map of string keys to elements.
    Map(Box<Kind>),
}

impl Kind {
    /// The nested block schema of this kind, or of its elements.
    pub fn block(&self) -> Option<&Schema> {
        match self {
            Kind::Block(inner) => Some(inner),
            Kind::List(of) | Kind::Set(of) | Kind::Map(of) => of.block(),
            _ => None,
        }
    }

    pub fn block_mut(&mut self) -> Option<&mut Schema> {
        match self {
            Kind::Block(inner) => Some(inner),
            Kind::List(of) | Kind::Set(of) | Kind::Map(of) => of.block_mut(),
            _ => None,
        }
    }
}

/// Presence is whether an attribute is configured by the user, computed by
/// the provider, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    Computed,
    OptionalComputed,
}

impl Presence {
    pub fn is_configurable(&self) -> bool {
        !matches!(self, Presence::Computed)
    }
}

/// Hasher of set elements.
pub type SetHash = fn(&Value) -> u32;

/// Canonicalizes a string value before it's stored, such as lower-casing
/// a tag or converting a timestamp to UTC.
pub type StateFunc = fn(&str) -> String;

/// Attribute is the schema of a single named attribute.
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(flatten)]
    pub kind: Kind,
    pub presence: Presence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip)]
    pub set_hash: Option<SetHash>,
    #[serde(skip)]
    pub state_func: Option<StateFunc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
}

impl Attribute {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            presence: Presence::Optional,
            default: None,
            validators: Vec::new(),
            conflicts_with: Vec::new(),
            max_items: None,
            min_items: None,
            set_hash: None,
            state_func: None,
            description: None,
            sensitive: false,
        }
    }

    pub fn bool() -> Self {
        Self::new(Kind::Bool)
    }
    pub fn int() -> Self {
        Self::new(Kind::Int)
    }
    pub fn float() -> Self {
        Self::new(Kind::Float)
    }
    pub fn string() -> Self {
        Self::new(Kind::String)
    }
    pub fn duration() -> Self {
        Self::new(Kind::Duration)
    }
    pub fn block(schema: Schema) -> Self {
        Self::new(Kind::Block(schema))
    }
    pub fn list(of: Kind) -> Self {
        Self::new(Kind::List(Box::new(of)))
    }
    pub fn set(of: Kind) -> Self {
        Self::new(Kind::Set(Box::new(of)))
    }
    pub fn map(of: Kind) -> Self {
        Self::new(Kind::Map(Box::new(of)))
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }
    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }
    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
    pub fn conflicts_with(mut self, names: &[&str]) -> Self {
        self.conflicts_with
            .extend(names.iter().map(|n| n.to_string()));
        self
    }
    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }
    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }
    pub fn hash_with(mut self, hasher: SetHash) -> Self {
        self.set_hash = Some(hasher);
        self
    }
    pub fn state_func(mut self, func: StateFunc) -> Self {
        self.state_func = Some(func);
        self
    }
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Schema is a block of named attributes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    pub attributes: BTreeMap<String, Attribute>,
    /// Groups of attributes of which exactly one must be set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exactly_one_of: Vec<Vec<String>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn exactly_one_of(mut self, names: &[&str]) -> Self {
        self.exactly_one_of
            .push(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up the attribute addressed by a path, skipping element indices
    /// and map keys.
    pub fn lookup(&self, path: &crate::Path) -> Option<&Attribute> {
        use crate::path::Token;

        let mut schema = self;
        let mut kind: Option<&Kind> = None;
        let mut found: Option<&Attribute> = None;

        for token in path.iter() {
            match (kind, token) {
                (None, Token::Property(name)) => {
                    let attr = schema.get(name)?;
                    found = Some(attr);
                    kind = Some(&attr.kind);
                }
                (Some(Kind::List(of) | Kind::Set(of)), Token::Index(_))
                | (Some(Kind::Map(of)), Token::Property(_)) => {
                    kind = Some(of.as_ref());
                    if let Kind::Block(inner) = of.as_ref() {
                        schema = inner;
                        kind = None;
                    }
                }
                _ => return None,
            }
            if let Some(Kind::Block(inner)) = kind {
                schema = inner;
                kind = None;
            }
        }
        found
    }

    /// Dotted names of every attribute, nested blocks included, without
    /// element indices (`if.value.over.last`).
    pub fn names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.walk_names("", &mut out);
        out
    }

    fn walk_names(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, attr) in self.iter() {
            let full = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            };
            out.push(full.clone());

            if let Some(inner) = attr.kind.block() {
                inner.walk_names(&full, out);
            }
        }
    }

    /// Visit every attribute mutably, with its dotted name.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&str, &mut Attribute)) {
        self.walk_mut_inner("", visit)
    }

    fn walk_mut_inner(&mut self, prefix: &str, visit: &mut dyn FnMut(&str, &mut Attribute)) {
        for (name, attr) in self.attributes.iter_mut() {
            let full = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            visit(&full, attr);

            if let Some(inner) = attr.kind.block_mut() {
                inner.walk_mut_inner(&full, visit);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Path;

    fn fixture() -> Schema {
        Schema::new()
            .attr("name", Attribute::string().required())
            .attr(
                "if",
                Attribute::list(Kind::Block(
                    Schema::new().attr(
                        "value",
                        Attribute::block(Schema::new().attr("absent", Attribute::duration())),
                    ),
                )),
            )
            .attr("tags", Attribute::set(Kind::String))
    }

    #[test]
    fn test_lookup() {
        let schema = fixture();

        for (case, expect) in [
            ("name", Some("string")),
            ("if.0.value.absent", Some("duration")),
            ("if.0.value", Some("block")),
            ("if.0.missing", None),
            ("tags.3", Some("set")),
            ("name.inner", None),
        ] {
            let kind = schema.lookup(&Path::parse(case)).map(|a| match a.kind {
                Kind::String => "string",
                Kind::Duration => "duration",
                Kind::Block(_) => "block",
                Kind::Set(_) => "set",
                _ => "other",
            });
            assert_eq!(kind, expect, "{case}");
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(
            fixture().names(),
            vec!["if", "if.value", "if.value.absent", "name", "tags"]
        );
    }
}
