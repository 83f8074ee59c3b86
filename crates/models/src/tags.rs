use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

lazy_static! {
    // TAG_RE is a category, optionally followed by ':' and a value.
    // Neither half may contain whitespace, and the category cannot be empty.
    pub static ref TAG_RE: Regex = Regex::new(r"^[^:\s]+(:\S*)?$").unwrap();
}

/// Tag is a `category[:value]` pair which is attached to checks, metrics,
/// rule sets, and most other platform entities.
///
/// Tags compare case-insensitively: the canonical form is fully lower-cased,
/// and that is the only form a Tag ever holds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    pub fn from_parts(category: &str, value: &str) -> Self {
        if value.is_empty() {
            Self::new(category)
        } else {
            Self::new(format!("{category}:{value}"))
        }
    }

    /// Category is the portion before the first ':', or the whole tag.
    pub fn category(&self) -> &str {
        match self.0.split_once(':') {
            Some((category, _)) => category,
            None => &self.0,
        }
    }

    /// Value is the portion after the first ':', or empty.
    pub fn value(&self) -> &str {
        match self.0.split_once(':') {
            Some((_, value)) => value,
            None => "",
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        TAG_RE.is_match(&self.0)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Tag> for String {
    fn from(t: Tag) -> Self {
        t.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::ops::Deref for Tag {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// Tags is an unordered set of Tag.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Tags(BTreeSet<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<Tag>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn remove(&mut self, tag: &Tag) -> bool {
        self.0.remove(tag)
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    pub fn extend(&mut self, other: &Tags) {
        self.0.extend(other.0.iter().cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// Sorted, lower-cased string form, as the platform expects.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|t| t.0.clone()).collect()
    }
}

impl<T: Into<Tag>> FromIterator<T> for Tags {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::collections::btree_set::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod test {
    use super::{Tag, Tags};

    #[test]
    fn test_tag_parts() {
        for (case, category, value) in [
            ("App:RDS", "app", "rds"),
            ("author:terraform", "author", "terraform"),
            ("bare", "bare", ""),
            ("url:http://example.com", "url", "http://example.com"),
            ("  Spaced:Out  ", "spaced", "out"),
            ("trailing:", "trailing", ""),
        ] {
            let tag = Tag::new(case);
            assert_eq!(tag.category(), category, "{case}");
            assert_eq!(tag.value(), value, "{case}");
        }
    }

    #[test]
    fn test_tags_compare_case_insensitively() {
        let tags: Tags = ["App:RDS", "app:rds", "APP:rds"].into_iter().collect();
        assert_eq!(tags.len(), 1);
        assert!(tags.contains(&Tag::new("app:RDS")));
        assert_eq!(tags.to_strings(), vec!["app:rds".to_string()]);
    }

    #[test]
    fn test_tag_validity() {
        assert!(Tag::new("app:rds").is_valid());
        assert!(Tag::new("app").is_valid());
        assert!(!Tag::new(":rds").is_valid());
        assert!(!Tag::new("a b:c").is_valid());
    }

    #[test]
    fn test_tags_serde() {
        let tags: Tags = serde_json::from_value(serde_json::json!(["B:two", "a:One"])).unwrap();
        assert_eq!(
            serde_json::to_value(&tags).unwrap(),
            serde_json::json!(["a:one", "b:two"])
        );
    }
}
