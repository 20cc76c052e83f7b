//! Declared configuration schema
//!
//! Every configuration field the application knows about is declared exactly
//! once in [`FIELDS`], together with its kind, default and validation rule.
//! Keys found in sources that are not declared here are never consulted.

use crate::config::value::{Secret, Value};
use crate::{Error, Result};
use chrono::{NaiveTime, Weekday};
use std::path::PathBuf;
use url::Url;

/// Extra validation applied after a raw value was coerced to its kind
pub type Validator = fn(&Value) -> std::result::Result<(), String>;

/// Semantic type of a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form text, trimmed
    Text,
    /// Signed integer within an inclusive range
    Integer { min: i64, max: i64 },
    /// `true/false`, `1/0`, `yes/no`, `on/off`
    Bool,
    /// Absolute URL
    Url,
    /// Filesystem path
    Path,
    /// Time of day, `HH:MM` or `HH:MM:SS`
    Time,
    /// Day of week, `0` (Sunday) to `6` (Saturday) or an English day name
    Weekday,
    /// Case-insensitive membership in a fixed set, normalized to lowercase
    OneOf(&'static [&'static str]),
    /// Comma-separated list of integer ids
    IdList,
    /// Secret text with a minimum length
    Secret { min_len: usize },
}

impl FieldKind {
    /// Coerce a raw string to this kind
    ///
    /// Returns the human-readable reason on failure.
    pub fn coerce(&self, raw: &str) -> std::result::Result<Value, String> {
        let trimmed = raw.trim();
        match *self {
            Self::Text => Ok(Value::Text(trimmed.to_string())),
            Self::Integer { min, max } => {
                let n: i64 = trimmed
                    .parse()
                    .map_err(|_| "expected an integer".to_string())?;
                if n < min || n > max {
                    return Err(format!("must be between {min} and {max}"));
                }
                Ok(Value::Integer(n))
            }
            Self::Bool => parse_bool(trimmed).map(Value::Bool),
            Self::Url => Url::parse(trimmed)
                .map(Value::Url)
                .map_err(|e| format!("malformed URL: {e}")),
            Self::Path => {
                if trimmed.contains('\0') {
                    return Err("path contains a NUL byte".to_string());
                }
                Ok(Value::Path(PathBuf::from(trimmed)))
            }
            Self::Time => parse_time(trimmed).map(Value::Time),
            Self::Weekday => parse_weekday(trimmed).map(Value::Weekday),
            Self::OneOf(choices) => {
                let lowered = trimmed.to_ascii_lowercase();
                if choices.contains(&lowered.as_str()) {
                    Ok(Value::Text(lowered))
                } else {
                    Err(format!("expected one of: {}", choices.join(", ")))
                }
            }
            Self::IdList => parse_id_list(trimmed).map(Value::IdList),
            Self::Secret { min_len } => {
                if trimmed.chars().count() < min_len {
                    return Err(format!("must be at least {min_len} characters long"));
                }
                Ok(Value::Secret(Secret::new(trimmed)))
            }
        }
    }
}

fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("expected a boolean (true/false, 1/0, yes/no, on/off)".to_string()),
    }
}

fn parse_time(raw: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| "expected a time of day in HH:MM format".to_string())
}

fn parse_weekday(raw: &str) -> std::result::Result<Weekday, String> {
    if let Ok(n) = raw.parse::<u8>() {
        return match n {
            0 => Ok(Weekday::Sun),
            1 => Ok(Weekday::Mon),
            2 => Ok(Weekday::Tue),
            3 => Ok(Weekday::Wed),
            4 => Ok(Weekday::Thu),
            5 => Ok(Weekday::Fri),
            6 => Ok(Weekday::Sat),
            _ => Err("weekday must be between 0 (Sunday) and 6 (Saturday)".to_string()),
        };
    }
    raw.parse::<Weekday>()
        .map_err(|_| "expected a weekday number 0-6 or a day name".to_string())
}

fn parse_id_list(raw: &str) -> std::result::Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<i64>()
                .map_err(|_| format!("entry {entry:?} is not an integer id"))
        })
        .collect()
}

/// Declaration of a single configuration field
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Raw default, coerced and validated like any source value
    pub default: Option<&'static str>,
    /// Whether resolution fails when no source and no default provide a value
    pub required: bool,
    pub validator: Option<Validator>,
}

impl FieldSpec {
    /// A field that must come from some source
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            default: None,
            required: true,
            validator: None,
        }
    }

    /// A field that may stay unset
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            default: None,
            required: false,
            validator: None,
        }
    }

    /// A field that falls back to `default` when no source defines it
    pub const fn with_default(name: &'static str, kind: FieldKind, default: &'static str) -> Self {
        Self {
            name,
            kind,
            default: Some(default),
            required: false,
            validator: None,
        }
    }

    /// Attach an extra validation rule
    pub const fn validated(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn is_secret(&self) -> bool {
        matches!(self.kind, FieldKind::Secret { .. })
    }

    /// Coerce and validate a raw value for this field
    ///
    /// Secret raw values are redacted in the returned error.
    pub fn coerce(&self, raw: &str) -> Result<Value> {
        let shown = if self.is_secret() {
            crate::config::value::REDACTED
        } else {
            raw
        };
        let value = self
            .kind
            .coerce(raw)
            .map_err(|reason| Error::invalid(self.name, shown, reason))?;
        if let Some(validate) = self.validator {
            validate(&value).map_err(|reason| Error::invalid(self.name, shown, reason))?;
        }
        Ok(value)
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Look up a field declaration by name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}

/// Field names of the application schema
pub mod keys {
    pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
    pub const TELEGRAM_WEBHOOK_URL: &str = "TELEGRAM_WEBHOOK_URL";
    pub const TELEGRAM_MODE: &str = "TELEGRAM_MODE";
    pub const TRELLO_API_KEY: &str = "TRELLO_API_KEY";
    pub const TRELLO_API_SECRET: &str = "TRELLO_API_SECRET";
    pub const TRELLO_TOKEN: &str = "TRELLO_TOKEN";
    pub const TRELLO_BOARD_ID: &str = "TRELLO_BOARD_ID";
    pub const DATABASE_PATH: &str = "DATABASE_PATH";
    pub const ADMIN_IDS: &str = "ADMIN_IDS";
    pub const DEFAULT_MANAGER_ID: &str = "DEFAULT_MANAGER_ID";
    pub const REPORT_REMINDER_DAY: &str = "REPORT_REMINDER_DAY";
    pub const REPORT_REMINDER_TIME: &str = "REPORT_REMINDER_TIME";
    pub const REPORT_DEADLINE_DAY: &str = "REPORT_DEADLINE_DAY";
    pub const REPORT_DEADLINE_TIME: &str = "REPORT_DEADLINE_TIME";
    pub const DEFAULT_LANGUAGE: &str = "DEFAULT_LANGUAGE";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_FILE: &str = "LOG_FILE";
    pub const API_ENABLED: &str = "API_ENABLED";
    pub const API_HOST: &str = "API_HOST";
    pub const API_PORT: &str = "API_PORT";
    pub const SECRET_KEY: &str = "SECRET_KEY";
    pub const API_KEY: &str = "API_KEY";
    pub const PDF_TEMPLATES_PATH: &str = "PDF_TEMPLATES_PATH";
    pub const PDF_TEMP_PATH: &str = "PDF_TEMP_PATH";
    pub const APP_ROOT: &str = "APP_ROOT";
}

/// Secret key shipped as a fallback; flagged at load time when in use
pub const DEFAULT_SECRET_KEY: &str = "default-secret-key";

const TELEGRAM_MODES: &[&str] = &["polling", "webhook"];
const LANGUAGES: &[&str] = &["uk", "en"];
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn http_url(value: &Value) -> std::result::Result<(), String> {
    match value.as_url() {
        Some(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Some(url) => Err(format!("unsupported URL scheme {:?}", url.scheme())),
        None => Ok(()),
    }
}

fn no_whitespace(value: &Value) -> std::result::Result<(), String> {
    match value.as_text() {
        Some(text) if text.chars().any(char::is_whitespace) => {
            Err("must not contain whitespace".to_string())
        }
        _ => Ok(()),
    }
}

/// The application's configuration schema
pub static FIELDS: &[FieldSpec] = &[
    // Telegram
    FieldSpec::required(keys::TELEGRAM_BOT_TOKEN, FieldKind::Secret { min_len: 10 }),
    FieldSpec::optional(keys::TELEGRAM_WEBHOOK_URL, FieldKind::Url).validated(http_url),
    FieldSpec::with_default(
        keys::TELEGRAM_MODE,
        FieldKind::OneOf(TELEGRAM_MODES),
        "polling",
    ),
    // Trello
    FieldSpec::optional(keys::TRELLO_API_KEY, FieldKind::Secret { min_len: 1 }),
    FieldSpec::optional(keys::TRELLO_API_SECRET, FieldKind::Secret { min_len: 1 }),
    FieldSpec::optional(keys::TRELLO_TOKEN, FieldKind::Secret { min_len: 1 }),
    FieldSpec::optional(keys::TRELLO_BOARD_ID, FieldKind::Text).validated(no_whitespace),
    // Database
    FieldSpec::with_default(keys::DATABASE_PATH, FieldKind::Path, "./data/reports.db"),
    // Admin
    FieldSpec::with_default(keys::ADMIN_IDS, FieldKind::IdList, ""),
    FieldSpec::with_default(
        keys::DEFAULT_MANAGER_ID,
        FieldKind::Integer {
            min: 0,
            max: i64::MAX,
        },
        "0",
    ),
    // Report schedule
    FieldSpec::with_default(keys::REPORT_REMINDER_DAY, FieldKind::Weekday, "5"),
    FieldSpec::with_default(keys::REPORT_REMINDER_TIME, FieldKind::Time, "15:00"),
    FieldSpec::with_default(keys::REPORT_DEADLINE_DAY, FieldKind::Weekday, "5"),
    FieldSpec::with_default(keys::REPORT_DEADLINE_TIME, FieldKind::Time, "18:00"),
    // Language
    FieldSpec::with_default(keys::DEFAULT_LANGUAGE, FieldKind::OneOf(LANGUAGES), "uk"),
    // Logging
    FieldSpec::with_default(keys::LOG_LEVEL, FieldKind::OneOf(LOG_LEVELS), "info"),
    FieldSpec::with_default(keys::LOG_FILE, FieldKind::Path, "./logs/app.log"),
    // API
    FieldSpec::with_default(keys::API_ENABLED, FieldKind::Bool, "true"),
    FieldSpec::with_default(keys::API_HOST, FieldKind::Text, "0.0.0.0").validated(no_whitespace),
    FieldSpec::with_default(
        keys::API_PORT,
        FieldKind::Integer { min: 1, max: 65535 },
        "3000",
    ),
    FieldSpec::with_default(
        keys::SECRET_KEY,
        FieldKind::Secret { min_len: 8 },
        DEFAULT_SECRET_KEY,
    ),
    FieldSpec::optional(keys::API_KEY, FieldKind::Secret { min_len: 1 }),
    // PDF
    FieldSpec::with_default(keys::PDF_TEMPLATES_PATH, FieldKind::Path, "./templates/pdf"),
    FieldSpec::with_default(keys::PDF_TEMP_PATH, FieldKind::Path, "./temp/pdf"),
    // Paths
    FieldSpec::with_default(keys::APP_ROOT, FieldKind::Path, "."),
];
