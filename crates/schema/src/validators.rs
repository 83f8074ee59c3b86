use models::{ids::Entity, Seconds, Tag};
use regex::Regex;
use serde_json::Value;

/// Validator is a constraint over an attribute's (normalized) value.
#[derive(Debug, Clone)]
pub enum Validator {
    /// String values must match the regex.
    Regex(Regex),
    /// Integer values must fall within the inclusive range.
    IntRange { min: i64, max: i64 },
    /// Float values must fall within the inclusive range.
    FloatRange { min: f64, max: f64 },
    /// String values must be absolute URLs with one of the given schemes.
    Url { schemes: &'static [&'static str] },
    /// String values must be one of the given choices.
    OneOf(&'static [&'static str]),
    /// Duration values must fall within the inclusive range of seconds.
    Duration { min: Option<u64>, max: Option<u64> },
    /// String values must be well-formed `category:value` tags.
    Tag,
    /// String values must be CIDs of the entity.
    Cid(Entity),
}

impl Validator {
    pub fn regex(pattern: &str) -> Self {
        // Patterns are compile-time literals of the provider's schemas.
        Validator::Regex(Regex::new(pattern).expect("validator regex must compile"))
    }

    /// Check `value`, returning a description of the failed rule.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::Regex(re) => {
                let s = as_str(value)?;
                if re.is_match(s) {
                    Ok(())
                } else {
                    Err(format!("{s:?} doesn't match {}", re.as_str()))
                }
            }
            Validator::IntRange { min, max } => {
                let v = value
                    .as_i64()
                    .ok_or_else(|| format!("expected an integer, not {value}"))?;
                if (*min..=*max).contains(&v) {
                    Ok(())
                } else {
                    Err(format!("{v} is not within {min}-{max}"))
                }
            }
            Validator::FloatRange { min, max } => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| format!("expected a number, not {value}"))?;
                if *min <= v && v <= *max {
                    Ok(())
                } else {
                    Err(format!("{v} is not within {min}-{max}"))
                }
            }
            Validator::Url { schemes } => {
                let s = as_str(value)?;
                let url = url::Url::parse(s).map_err(|err| format!("{s:?} is not a URL: {err}"))?;
                if !schemes.contains(&url.scheme()) {
                    return Err(format!(
                        "URL scheme {:?} must be one of {}",
                        url.scheme(),
                        schemes.join(", ")
                    ));
                }
                if url.host_str().map(str::is_empty).unwrap_or(true) {
                    return Err(format!("URL {s:?} has no host"));
                }
                Ok(())
            }
            Validator::OneOf(choices) => {
                let s = as_str(value)?;
                if choices.contains(&s) {
                    Ok(())
                } else {
                    Err(format!("{s:?} must be one of {}", choices.join(", ")))
                }
            }
            Validator::Duration { min, max } => {
                let secs = match value {
                    Value::String(s) => Seconds::parse(s).map_err(|err| err.to_string())?,
                    Value::Number(n) => Seconds(
                        n.as_u64()
                            .ok_or_else(|| format!("{n} is not a valid duration"))?,
                    ),
                    _ => return Err(format!("expected a duration, not {value}")),
                };
                if let Some(min) = min {
                    if secs.as_secs() < *min {
                        return Err(format!("duration {secs}s is less than {min}s"));
                    }
                }
                if let Some(max) = max {
                    if secs.as_secs() > *max {
                        return Err(format!("duration {secs}s is greater than {max}s"));
                    }
                }
                Ok(())
            }
            Validator::Tag => {
                let s = as_str(value)?;
                if Tag::new(s).is_valid() {
                    Ok(())
                } else {
                    Err(format!("{s:?} is not a valid tag"))
                }
            }
            Validator::Cid(entity) => {
                let s = as_str(value)?;
                entity.validate(s).map_err(|err| err.to_string())
            }
        }
    }
}

fn as_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, not {value}"))
}

impl std::fmt::Display for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validator::Regex(re) => write!(f, "matches {}", re.as_str()),
            Validator::IntRange { min, max } => write!(f, "integer within {min}-{max}"),
            Validator::FloatRange { min, max } => write!(f, "number within {min}-{max}"),
            Validator::Url { schemes } => write!(f, "URL with scheme {}", schemes.join("|")),
            Validator::OneOf(choices) => write!(f, "one of {}", choices.join("|")),
            Validator::Duration { min, max } => {
                write!(f, "duration")?;
                if let Some(min) = min {
                    write!(f, " >= {min}s")?;
                }
                if let Some(max) = max {
                    write!(f, " <= {max}s")?;
                }
                Ok(())
            }
            Validator::Tag => write!(f, "category:value tag"),
            Validator::Cid(entity) => write!(f, "/{}/ identifier", entity.name()),
        }
    }
}

impl serde::Serialize for Validator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validators() {
        for (validator, value, ok) in [
            (Validator::regex(r"^\d+$"), json!("123"), true),
            (Validator::regex(r"^\d+$"), json!("12a"), false),
            (Validator::IntRange { min: 1, max: 5 }, json!(5), true),
            (Validator::IntRange { min: 1, max: 5 }, json!(0), false),
            (Validator::FloatRange { min: 0.0, max: 1.0 }, json!(0.5), true),
            (Validator::Url { schemes: &["http", "https"] }, json!("https://example.com/x"), true),
            (Validator::Url { schemes: &["http", "https"] }, json!("ftp://example.com"), false),
            (Validator::Url { schemes: &["http", "https"] }, json!("/relative"), false),
            (Validator::OneOf(&["GET", "POST"]), json!("PUT"), false),
            (Validator::Duration { min: Some(60), max: None }, json!("2m"), true),
            (Validator::Duration { min: Some(60), max: None }, json!("30"), false),
            (Validator::Duration { min: None, max: Some(300) }, json!(600), false),
            (Validator::Tag, json!("author:terraform"), true),
            (Validator::Tag, json!("has space"), false),
            (Validator::Cid(Entity::Check), json!("/check/12"), true),
            (Validator::Cid(Entity::Check), json!("/check_bundle/12"), false),
            (Validator::OneOf(&["a"]), json!(1), false),
        ] {
            assert_eq!(validator.check(&value).is_ok(), ok, "{validator} {value}");
        }
    }
}
