//! Error type definitions
//!
//! Defines the error taxonomy of configuration resolution. Every variant is
//! fatal: the process entry point is expected to abort startup on any of them.

use thiserror::Error;

/// Main error type for configuration resolution
///
/// Variants carry owned strings only so that a failed resolution can be
/// cloned out of the process singleton on every access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required field had no value from any source and no default
    #[error("Missing required configuration field: {field}")]
    MissingRequiredField { field: String },

    /// A value was present but failed type coercion or validation
    #[error("Invalid value {value:?} for configuration field {field}: {reason}")]
    InvalidFieldValue {
        field: String,
        value: String,
        reason: String,
    },

    /// A mandatory source could not be located, read or parsed
    #[error("Configuration source {name} unavailable: {reason}")]
    UnknownSource { name: String, reason: String },

    /// Schema and settings disagree about a field
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a missing required field error
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Create an invalid field value error
    pub fn invalid(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown source error
    pub fn unknown_source(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnknownSource {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Name of the field this error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { field } | Self::InvalidFieldValue { field, .. } => {
                Some(field.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_error() {
        let err = Error::missing("API_KEY");
        assert!(matches!(err, Error::MissingRequiredField { .. }));
        assert_eq!(
            err.to_string(),
            "Missing required configuration field: API_KEY"
        );
        assert_eq!(err.field(), Some("API_KEY"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = Error::invalid("PORT", "abc", "expected an integer");
        assert!(matches!(err, Error::InvalidFieldValue { .. }));
        assert!(err.to_string().contains("\"abc\""));
        assert!(err.to_string().contains("PORT"));
        assert_eq!(err.field(), Some("PORT"));
    }

    #[test]
    fn test_unknown_source_error() {
        let err = Error::unknown_source("config.toml", "file not found");
        assert!(matches!(err, Error::UnknownSource { .. }));
        assert!(err.to_string().contains("config.toml"));
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = Error::internal("boom");
        assert_eq!(err.clone(), err);
    }
}
