//! Layered configuration resolution
//!
//! Merges a prioritized list of [`Source`]s with the defaults declared in a
//! schema, coerces every value to its declared kind and validates it.

use crate::config::schema::FieldSpec;
use crate::config::source::{Source, SourceKind};
use crate::config::value::Value;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Source { kind: SourceKind, name: String },
    Default,
}

impl Origin {
    fn from_source(source: &Source) -> Self {
        Self::Source {
            kind: source.kind(),
            name: source.name().to_string(),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source { kind, name } if name == &kind.to_string() || name == "overrides" => {
                write!(f, "{kind}")
            }
            Self::Source { kind, name } => write!(f, "{kind} ({name})"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// A coerced value together with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub value: Value,
    pub origin: Origin,
}

/// The validated outcome of a resolution, keyed by field name
///
/// Optional fields that no source defined are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    fields: BTreeMap<&'static str, ResolvedField>,
}

impl Resolved {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(|field| &field.value)
    }

    pub fn origin(&self, name: &str) -> Option<&Origin> {
        self.fields.get(name).map(|field| &field.origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ResolvedField)> {
        self.fields.iter().map(|(name, field)| (*name, field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Resolve `schema` against `sources`
///
/// `sources` is ordered by precedence, the first source that defines a field
/// wins. Empty or whitespace-only raw values count as undefined. Fields no
/// source defines fall back to their default; a required field with neither
/// fails with [`Error::MissingRequiredField`]. Fields are processed in
/// declaration order and the first failure is returned.
pub fn resolve(sources: &[Source], schema: &[FieldSpec]) -> Result<Resolved> {
    warn_unknown_keys(sources, schema);

    let mut fields = BTreeMap::new();
    for spec in schema {
        let found = sources.iter().find_map(|source| {
            source
                .get(spec.name)
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| (raw, Origin::from_source(source)))
        });

        let (raw, origin) = match (found, spec.default) {
            (Some(found), _) => found,
            (None, Some(default)) => (default, Origin::Default),
            (None, None) if spec.required => return Err(Error::missing(spec.name)),
            (None, None) => {
                debug!("Optional field {} is not set", spec.name);
                continue;
            }
        };

        let value = spec.coerce(raw)?;
        debug!("Resolved {} from {}", spec.name, origin);
        fields.insert(spec.name, ResolvedField { value, origin });
    }

    Ok(Resolved { fields })
}

// The environment carries plenty of unrelated variables, so only the other
// layers are checked.
fn warn_unknown_keys(sources: &[Source], schema: &[FieldSpec]) {
    let declared: HashSet<&str> = schema.iter().map(|spec| spec.name).collect();
    for source in sources {
        if source.kind() == SourceKind::Environment {
            continue;
        }
        for key in source.keys().filter(|key| !declared.contains(key)) {
            warn!(
                "Ignoring unknown configuration key {} from {}",
                key,
                source.name()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FieldKind;
    use pretty_assertions::assert_eq;

    const PORT: FieldKind = FieldKind::Integer { min: 1, max: 65535 };

    fn web_schema() -> Vec<FieldSpec> {
        vec![
            FieldSpec::with_default("PORT", PORT, "80"),
            FieldSpec::with_default("HOST", FieldKind::Text, "0.0.0.0"),
        ]
    }

    fn env(pairs: &[(&str, &str)]) -> Source {
        Source::from_pairs(SourceKind::Environment, "environment", pairs.iter().copied())
    }

    #[test]
    fn test_env_overrides_default() {
        let sources = [
            Source::overrides(Vec::<(String, String)>::new()),
            env(&[("PORT", "8080")]),
            Source::empty(SourceKind::File, "config.toml"),
        ];

        let resolved = resolve(&sources, &web_schema()).unwrap();

        assert_eq!(resolved.get("PORT"), Some(&Value::Integer(8080)));
        assert_eq!(resolved.get("HOST"), Some(&Value::Text("0.0.0.0".into())));
        assert_eq!(
            resolved.origin("PORT"),
            Some(&Origin::Source {
                kind: SourceKind::Environment,
                name: "environment".into()
            })
        );
        assert!(resolved.origin("HOST").unwrap().is_default());
    }

    #[test]
    fn test_override_beats_environment() {
        let sources = [
            Source::overrides([("PORT", "9000")]),
            env(&[("PORT", "8080")]),
        ];

        let resolved = resolve(&sources, &web_schema()).unwrap();
        assert_eq!(resolved.get("PORT"), Some(&Value::Integer(9000)));
    }

    #[test]
    fn test_missing_required_field() {
        let schema = [
            FieldSpec::with_default("PORT", PORT, "80"),
            FieldSpec::required("API_KEY", FieldKind::Secret { min_len: 1 }),
        ];

        let err = resolve(&[env(&[])], &schema).unwrap_err();
        assert_eq!(err, Error::missing("API_KEY"));
    }

    #[test]
    fn test_invalid_value_names_field_and_raw_value() {
        let err = resolve(&[env(&[("PORT", "eighty")])], &web_schema()).unwrap_err();
        assert_eq!(
            err,
            Error::invalid("PORT", "eighty", "expected an integer")
        );
    }

    #[test]
    fn test_empty_value_falls_through() {
        let sources = [
            Source::overrides([("PORT", "  ")]),
            env(&[("PORT", "")]),
            Source::from_pairs(SourceKind::File, "config.toml", [("PORT", "7000")]),
        ];

        let resolved = resolve(&sources, &web_schema()).unwrap();
        assert_eq!(resolved.get("PORT"), Some(&Value::Integer(7000)));
    }

    #[test]
    fn test_empty_value_for_required_field_is_missing() {
        let schema = [FieldSpec::required("API_KEY", FieldKind::Text)];
        let err = resolve(&[env(&[("API_KEY", "")])], &schema).unwrap_err();
        assert_eq!(err, Error::missing("API_KEY"));
    }

    #[test]
    fn test_optional_field_absent() {
        let schema = [FieldSpec::optional("WEBHOOK", FieldKind::Url)];
        let resolved = resolve(&[env(&[])], &schema).unwrap();
        assert!(resolved.get("WEBHOOK").is_none());
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_invalid_default_is_reported() {
        let schema = [FieldSpec::with_default("PORT", PORT, "0")];
        let err = resolve(&[], &schema).unwrap_err();
        assert!(matches!(err, Error::InvalidFieldValue { ref field, .. } if field == "PORT"));
    }

    #[test]
    fn test_first_failure_in_declaration_order() {
        let schema = [
            FieldSpec::required("A", PORT),
            FieldSpec::required("B", PORT),
        ];
        let err = resolve(&[env(&[("B", "x")])], &schema).unwrap_err();
        assert_eq!(err, Error::missing("A"));
    }

    #[test]
    fn test_sources_are_not_mutated() {
        let sources = vec![Source::overrides([("PORT", "9000"), ("EXTRA", "1")])];
        let before = sources.clone();
        resolve(&sources, &web_schema()).unwrap();
        assert_eq!(sources, before);
    }

    #[test]
    fn test_origin_display() {
        let file = Origin::Source {
            kind: SourceKind::File,
            name: "/etc/sami/config.toml".into(),
        };
        assert_eq!(file.to_string(), "file (/etc/sami/config.toml)");
        let env = Origin::Source {
            kind: SourceKind::Environment,
            name: "environment".into(),
        };
        assert_eq!(env.to_string(), "environment");
        let overrides = Origin::Source {
            kind: SourceKind::Override,
            name: "overrides".into(),
        };
        assert_eq!(overrides.to_string(), "override");
        assert_eq!(Origin::Default.to_string(), "default");
    }
}
