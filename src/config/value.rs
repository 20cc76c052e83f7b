//! Typed configuration values
//!
//! Raw source values are strings; after coercion every field holds one of the
//! [`Value`] variants below.

use chrono::{NaiveTime, Weekday};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Placeholder printed instead of secret material
pub const REDACTED: &str = "[REDACTED]";

/// A secret string that never shows up in `Debug`, logs or serialized output
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the secret material
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({REDACTED})")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

/// A coerced configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Bool(bool),
    Url(Url),
    Path(PathBuf),
    Time(NaiveTime),
    Weekday(Weekday),
    IdList(Vec<i64>),
    Secret(Secret),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_weekday(&self) -> Option<Weekday> {
        match self {
            Self::Weekday(day) => Some(*day),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[i64]> {
        match self {
            Self::IdList(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn as_secret(&self) -> Option<&Secret> {
        match self {
            Self::Secret(secret) => Some(secret),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Url(url) => f.write_str(url.as_str()),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M")),
            Self::Weekday(day) => write!(f, "{day}"),
            Self::IdList(ids) => {
                let joined: Vec<String> = ids.iter().map(ToString::to_string).collect();
                f.write_str(&joined.join(","))
            }
            Self::Secret(_) => f.write_str(REDACTED),
        }
    }
}
