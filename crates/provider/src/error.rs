use itertools::Itertools;
use models::Violation;

/// Error of a provider operation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A single attribute failed validation.
    #[error("{path}: {rule}")]
    Validation { path: String, rule: String },
    /// Several attributes failed validation.
    #[error("invalid configuration:\n{}", .0.iter().map(|v| format!("  {v}")).join("\n"))]
    Invalid(Vec<Violation>),
    /// An internal invariant of the provider was violated.
    #[error("PROVIDER BUG: {0}")]
    Translation(String),
    #[error("{entity} {id:?}: {source}")]
    Platform {
        entity: &'static str,
        id: String,
        #[source]
        source: api::Error,
    },
    #[error("{entity} {id:?} does not exist")]
    Missing { entity: &'static str, id: String },
    #[error("operation was cancelled")]
    Cancelled,
    #[error(transparent)]
    State(#[from] schema::Error),
}

impl Error {
    /// Build from a non-empty list of violations.
    pub fn invalid(mut violations: Vec<Violation>) -> Self {
        if violations.len() == 1 {
            let Violation { path, rule } = violations.remove(0);
            Error::Validation { path, rule }
        } else {
            Error::Invalid(violations)
        }
    }

    /// Whether this is the platform reporting that an object doesn't exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Platform { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Log a translation fault which cannot be recovered from, and return it.
pub fn provider_bug(message: impl Into<String>) -> Error {
    let message = message.into();
    tracing::error!("PROVIDER BUG: {message}");
    Error::Translation(message)
}

/// Log a translation fault which the caller recovers from.
pub fn fault(message: impl std::fmt::Display) {
    tracing::error!("PROVIDER BUG: {message}");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_invalid_formatting() {
        let one = Error::invalid(vec![Violation::new("if.0.value", "exactly one predicate")]);
        assert_eq!(one.to_string(), "if.0.value: exactly one predicate");

        let many = Error::invalid(vec![
            Violation::new("name", "attribute is required"),
            Violation::new("period", "expected a duration, not \"soon\""),
        ]);
        assert_eq!(
            many.to_string(),
            "invalid configuration:\n  name: attribute is required\n  period: expected a duration, not \"soon\""
        );
    }

    #[test]
    fn test_platform_errors() {
        let err = Error::Platform {
            entity: "check",
            id: "/check_bundle/1".to_string(),
            source: api::Error::Status {
                status: 404,
                body: "not found".to_string(),
            },
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "check \"/check_bundle/1\": API response code 404: not found"
        );
        assert!(!Error::Cancelled.is_not_found());
    }
}
