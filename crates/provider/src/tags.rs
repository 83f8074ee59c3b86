use crate::Meta;
use models::{Tag, Tags};
use schema::{hash::Buffer, Attribute, Kind, Validator};
use serde_json::Value;

/// Attribute of a set of tags. Tags are lower-cased as they're stored, and
/// hash by their lower-cased form.
pub fn attribute() -> Attribute {
    Attribute::set(Kind::String)
        .validate(Validator::Tag)
        .hash_with(hash)
        .state_func(fold)
        .describe("Tags of the form category:value")
}

pub fn hash(v: &Value) -> u32 {
    let mut buf = Buffer::new();
    if let Some(s) = v.as_str() {
        buf.string(&s.to_lowercase());
    }
    buf.sum()
}

fn fold(s: &str) -> String {
    Tag::new(s).to_string()
}

/// Tags to send to the platform: configured tags, plus the default tag
/// when auto-tagging.
pub fn encode(tags: &Tags, meta: &Meta) -> Vec<String> {
    let mut tags = tags.clone();
    if meta.auto_tag {
        tags.insert(meta.default_tag.clone());
    }
    tags.to_strings()
}

/// Tags received from the platform, less the default tag when auto-tagging.
pub fn decode(tags: &[String], meta: &Meta) -> Tags {
    let mut tags: Tags = tags.iter().map(String::as_str).collect();
    if meta.auto_tag {
        tags.remove(&meta.default_tag);
    }
    tags
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tags_hash_case_insensitively() {
        assert_eq!(hash(&json!("App:RDS")), hash(&json!("app:rds")));
        assert_ne!(hash(&json!("app:rds")), hash(&json!("app:ec2")));
        assert_eq!(fold(" App:RDS "), "app:rds");
    }

    #[test]
    fn test_auto_tagging() {
        let tags: Tags = ["env:prod"].into_iter().collect();
        let auto = Meta {
            auto_tag: true,
            ..Meta::default()
        };

        assert_eq!(encode(&tags, &Meta::default()), vec!["env:prod"]);
        let wire = encode(&tags, &auto);
        assert_eq!(wire, vec!["author:terraform", "env:prod"]);

        assert_eq!(decode(&wire, &auto), tags);
        assert_eq!(decode(&wire, &Meta::default()).len(), 2);
    }
}
