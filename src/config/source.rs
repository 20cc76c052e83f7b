//! Raw configuration sources
//!
//! A [`Source`] is an immutable snapshot of key to raw string values taken
//! from one provider: explicit overrides, the process environment, a dotenv
//! file or a TOML config file.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Kind of provider a source was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Override,
    Environment,
    DotEnv,
    File,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Override => "override",
            Self::Environment => "environment",
            Self::DotEnv => "dotenv",
            Self::File => "file",
        };
        f.write_str(name)
    }
}

/// A snapshot of raw configuration values from one provider
#[derive(Clone, PartialEq, Eq)]
pub struct Source {
    kind: SourceKind,
    name: String,
    values: BTreeMap<String, String>,
}

impl fmt::Debug for Source {
    // Values may hold secrets, only keys are shown
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Source {
    /// Build a source from arbitrary key/value pairs
    pub fn from_pairs<I, K, V>(kind: SourceKind, name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind,
            name: name.into(),
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// An empty source, used when an optional file is absent
    pub fn empty(kind: SourceKind, name: impl Into<String>) -> Self {
        Self::from_pairs(kind, name, std::iter::empty::<(String, String)>())
    }

    /// Explicit overrides, the highest-precedence layer
    pub fn overrides<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_pairs(SourceKind::Override, "overrides", pairs)
    }

    /// Snapshot of the current process environment
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn environment() -> Self {
        let pairs = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::from_pairs(SourceKind::Environment, "environment", pairs)
    }

    /// Read a `KEY=VALUE` dotenv file
    ///
    /// The process environment is left untouched; the file becomes its own layer.
    /// A missing file is an error only when `required` is set.
    pub fn dotenv(path: &Path, required: bool) -> Result<Self> {
        let name = path.display().to_string();
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() && !required => {
                warn!("Dotenv file not found: {:?}, skipping", path);
                return Ok(Self::empty(SourceKind::DotEnv, name));
            }
            Err(e) => return Err(Error::unknown_source(name, e.to_string())),
        };

        let mut values = BTreeMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| Error::unknown_source(&name, e.to_string()))?;
            values.insert(key, value);
        }
        debug!("Read {} entries from dotenv file {:?}", values.len(), path);

        Ok(Self {
            kind: SourceKind::DotEnv,
            name,
            values,
        })
    }

    /// Read a TOML config file
    ///
    /// A missing file is an error only when `required` is set; unreadable or
    /// malformed files are always errors.
    pub fn toml_file(path: &Path, required: bool) -> Result<Self> {
        let name = path.display().to_string();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                warn!("Configuration file not found: {:?}, skipping", path);
                return Ok(Self::empty(SourceKind::File, name));
            }
            Err(e) => return Err(Error::unknown_source(name, e.to_string())),
        };
        let source = Self::from_toml_str(&text, name)?;
        debug!("Read {} entries from configuration file {:?}", source.len(), path);
        Ok(source)
    }

    /// Parse TOML text into a file source
    ///
    /// Keys are upper-cased and nested tables are flattened with `_`, so
    /// `[api] port = 3000` defines `API_PORT`. Arrays of scalars are joined
    /// with `,`.
    pub fn from_toml_str(text: &str, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let table: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| Error::unknown_source(&name, e.to_string()))?;

        let mut values = BTreeMap::new();
        flatten_table(None, &table, &mut values)
            .map_err(|reason| Error::unknown_source(&name, reason))?;

        Ok(Self {
            kind: SourceKind::File,
            name,
            values,
        })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Human-readable origin, a file path for file-backed sources
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn flatten_table(
    prefix: Option<&str>,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> std::result::Result<(), String> {
    for (key, value) in table {
        let key = match prefix {
            Some(prefix) => format!("{prefix}_{key}"),
            None => key.clone(),
        }
        .to_ascii_uppercase();

        match value {
            toml::Value::Table(inner) => flatten_table(Some(&key), inner, out)?,
            toml::Value::Array(items) => {
                let parts = items
                    .iter()
                    .map(|item| {
                        scalar_to_string(item)
                            .ok_or_else(|| format!("array {key} must contain only scalar values"))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                insert_unique(out, key, parts.join(","))?;
            }
            scalar => {
                let text = scalar_to_string(scalar)
                    .ok_or_else(|| format!("unsupported value for {key}"))?;
                insert_unique(out, key, text)?;
            }
        }
    }
    Ok(())
}

// `api_port`, `API_PORT` and `[api] port` all name the same field
fn insert_unique(
    out: &mut BTreeMap<String, String>,
    key: String,
    value: String,
) -> std::result::Result<(), String> {
    if out.contains_key(&key) {
        return Err(format!("duplicate key {key}"));
    }
    out.insert(key, value);
    Ok(())
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        // Debug keeps the fraction, so `3000.0` never passes as an integer
        toml::Value::Float(f) => Some(format!("{f:?}")),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(dt) => Some(dt.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
