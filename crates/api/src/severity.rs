use serde::{Deserialize, Serialize};

/// Severity as it appears on the wire. Depending on the entity and the age
/// of the record, the platform encodes severities as integers, strings,
/// or floats.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Severity {
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
}

impl Severity {
    /// Normalize to an integer severity, or None if the value isn't one.
    pub fn normalize(&self) -> Option<u8> {
        let n = match self {
            Severity::Int(i) => *i,
            Severity::Uint(u) => i64::try_from(*u).ok()?,
            Severity::Float(f) if f.fract() == 0.0 => *f as i64,
            Severity::Float(_) => return None,
            Severity::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.fract() == 0.0)? as i64,
        };
        u8::try_from(n).ok()
    }
}

impl From<u8> for Severity {
    fn from(s: u8) -> Self {
        Severity::Uint(s as u64)
    }
}
