use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Seconds is a duration which is configured either as a plain count of
/// seconds (`120`, `"120"`) or as an annotated duration (`"120s"`, `"2m"`),
/// and is always normalized to integer seconds.
///
/// It serializes as a string of decimal seconds, which is the form written
/// back into resource state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seconds(pub u64);

impl Seconds {
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn parse(s: &str) -> Result<Self, crate::Error> {
        let s = s.trim();

        if s.is_empty() {
            return Err(crate::Error::Duration {
                value: s.to_string(),
                reason: "duration is empty".to_string(),
            });
        }
        if let Ok(secs) = s.parse::<u64>() {
            return Ok(Self(secs));
        }
        match humantime::parse_duration(s) {
            Ok(d) => Ok(Self(d.as_secs())),
            Err(err) => Err(crate::Error::Duration {
                value: s.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Whole minutes, truncating any remainder.
    pub fn as_minutes(&self) -> u64 {
        self.0 / 60
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self(minutes.saturating_mul(60))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Seconds {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Seconds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Seconds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Seconds;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a count of seconds or a duration such as \"2m\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Seconds, E> {
                Ok(Seconds(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Seconds, E> {
                u64::try_from(v)
                    .map(Seconds)
                    .map_err(|_| E::custom(format!("duration {v} cannot be negative")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Seconds, E> {
                if v < 0.0 || !v.is_finite() {
                    return Err(E::custom(format!("duration {v} is out of range")));
                }
                Ok(Seconds(v as u64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Seconds, E> {
                Seconds::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// Parse a possibly-annotated duration into fractional seconds.
/// Plain numbers are taken as seconds.
pub fn parse_float_seconds(s: &str) -> Result<f64, crate::Error> {
    let s = s.trim();

    if let Ok(secs) = s.parse::<f64>() {
        if secs >= 0.0 && secs.is_finite() {
            return Ok(secs);
        }
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs_f64())
        .map_err(|err| crate::Error::Duration {
            value: s.to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod test {
    use super::{parse_float_seconds, Seconds};
    use serde_json::json;

    #[test]
    fn test_duration_normalization() {
        for (case, expect) in [
            ("120", 120),
            ("120s", 120),
            ("2m", 120),
            ("1h 30m", 5400),
            (" 70 ", 70),
            ("0", 0),
        ] {
            assert_eq!(Seconds::parse(case).unwrap(), Seconds(expect), "{case}");
        }

        for case in ["", "fast", "-5", "2 parsecs"] {
            Seconds::parse(case).unwrap_err();
        }
    }

    #[test]
    fn test_duration_serde() {
        let from_int: Seconds = serde_json::from_value(json!(120)).unwrap();
        let from_str: Seconds = serde_json::from_value(json!("2m")).unwrap();
        assert_eq!(from_int, from_str);
        assert_eq!(serde_json::to_value(from_str).unwrap(), json!("120"));

        serde_json::from_value::<Seconds>(json!(-1)).unwrap_err();
        serde_json::from_value::<Seconds>(json!(true)).unwrap_err();
    }

    #[test]
    fn test_minutes() {
        assert_eq!(Seconds(150).as_minutes(), 2);
        assert_eq!(Seconds::from_minutes(2), Seconds(120));
        assert_eq!(Seconds::from_minutes(u64::MAX), Seconds(u64::MAX));
    }

    #[test]
    fn test_float_seconds() {
        assert_eq!(parse_float_seconds("10.5").unwrap(), 10.5);
        assert_eq!(parse_float_seconds("1500ms").unwrap(), 1.5);
        parse_float_seconds("soon").unwrap_err();
    }
}
