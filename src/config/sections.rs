//! Configuration settings structure
//!
//! Defines the typed, immutable [`Settings`] built from a validated resolution.

use crate::config::loader::{ConfigLoader, LoadOptions};
use crate::config::resolver::{self, Resolved};
use crate::config::schema::{self, DEFAULT_SECRET_KEY, keys};
use crate::config::source::Source;
use crate::config::value::{Secret, Value};
use crate::{Error, Result};
use chrono::{NaiveTime, Weekday};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};
use url::Url;

/// Main configuration settings for the SAMI Weekly Reports system
///
/// Instances only come out of a successful resolution and expose read-only
/// accessors; there is no way to change a field afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    telegram: TelegramSettings,
    trello: TrelloSettings,
    database: DatabaseSettings,
    admin: AdminSettings,
    report: ReportSettings,
    language: LanguageSettings,
    logging: LoggingSettings,
    api: ApiSettings,
    pdf: PdfSettings,
    paths: PathSettings,
}

/// Telegram bot configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct TelegramSettings {
    pub bot_token: Secret,
    pub webhook_url: Option<Url>,
    pub mode: TelegramMode,
}

/// How the bot receives updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TelegramMode {
    Polling,
    Webhook,
}

/// Trello integration credentials
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct TrelloSettings {
    pub api_key: Option<Secret>,
    pub api_secret: Option<Secret>,
    pub token: Option<Secret>,
    pub board_id: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

/// Administrator configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct AdminSettings {
    /// Telegram ids with admin rights
    pub ids: Vec<i64>,
    pub default_manager_id: i64,
}

/// Weekly report schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct ReportSettings {
    pub reminder_day: Weekday,
    pub reminder_time: NaiveTime,
    pub deadline_day: Weekday,
    pub deadline_time: NaiveTime,
}

/// Interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Uk,
    En,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct LanguageSettings {
    pub default: Language,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub file: PathBuf,
}

/// HTTP API configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct ApiSettings {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub secret_key: Secret,
    pub api_key: Option<Secret>,
}

/// PDF rendering paths
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct PdfSettings {
    pub templates_path: PathBuf,
    pub temp_path: PathBuf,
}

/// Application directories, all derived from the application root
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct PathSettings {
    pub root: PathBuf,
    pub data: PathBuf,
    pub logs: PathBuf,
    pub temp: PathBuf,
}

impl FromStr for TelegramMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "polling" => Ok(Self::Polling),
            "webhook" => Ok(Self::Webhook),
            other => Err(Error::invalid(
                keys::TELEGRAM_MODE,
                other,
                "expected polling or webhook",
            )),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uk" => Ok(Self::Uk),
            "en" => Ok(Self::En),
            other => Err(Error::invalid(
                keys::DEFAULT_LANGUAGE,
                other,
                "expected uk or en",
            )),
        }
    }
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Uk => "uk",
            Self::En => "en",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(Error::invalid(keys::LOG_LEVEL, other, "unknown log level")),
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl AdminSettings {
    pub fn is_admin(&self, telegram_id: i64) -> bool {
        self.ids.contains(&telegram_id)
    }
}

impl ApiSettings {
    /// `host:port` the API listens on
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Whether the shipped fallback secret key is still in use
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key.expose() == DEFAULT_SECRET_KEY
    }
}

impl PathSettings {
    fn from_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            data: root.join("data"),
            logs: root.join("logs"),
            temp: root.join("temp"),
        }
    }
}

impl Settings {
    /// Resolve settings from `sources`, ordered by precedence
    pub fn resolve(sources: &[Source]) -> Result<Self> {
        let resolved = resolver::resolve(sources, schema::FIELDS)?;
        Self::from_resolved(&resolved)
    }

    /// Resolve settings from the sources described by `options`
    pub fn load(options: &LoadOptions) -> Result<Self> {
        ConfigLoader::new(options.clone()).load()
    }

    /// Build settings from a resolution of [`schema::FIELDS`]
    pub fn from_resolved(resolved: &Resolved) -> Result<Self> {
        let settings = Self {
            telegram: TelegramSettings {
                bot_token: required(resolved, keys::TELEGRAM_BOT_TOKEN, Value::as_secret)?
                    .clone(),
                webhook_url: optional(resolved, keys::TELEGRAM_WEBHOOK_URL, Value::as_url)?
                    .cloned(),
                mode: required(resolved, keys::TELEGRAM_MODE, Value::as_text)?.parse()?,
            },
            trello: TrelloSettings {
                api_key: optional(resolved, keys::TRELLO_API_KEY, Value::as_secret)?.cloned(),
                api_secret: optional(resolved, keys::TRELLO_API_SECRET, Value::as_secret)?
                    .cloned(),
                token: optional(resolved, keys::TRELLO_TOKEN, Value::as_secret)?.cloned(),
                board_id: optional(resolved, keys::TRELLO_BOARD_ID, Value::as_text)?
                    .map(str::to_string),
            },
            database: DatabaseSettings {
                path: required(resolved, keys::DATABASE_PATH, Value::as_path)?.to_path_buf(),
            },
            admin: AdminSettings {
                ids: required(resolved, keys::ADMIN_IDS, Value::as_ids)?.to_vec(),
                default_manager_id: required(
                    resolved,
                    keys::DEFAULT_MANAGER_ID,
                    Value::as_integer,
                )?,
            },
            report: ReportSettings {
                reminder_day: required(resolved, keys::REPORT_REMINDER_DAY, Value::as_weekday)?,
                reminder_time: required(resolved, keys::REPORT_REMINDER_TIME, Value::as_time)?,
                deadline_day: required(resolved, keys::REPORT_DEADLINE_DAY, Value::as_weekday)?,
                deadline_time: required(resolved, keys::REPORT_DEADLINE_TIME, Value::as_time)?,
            },
            language: LanguageSettings {
                default: required(resolved, keys::DEFAULT_LANGUAGE, Value::as_text)?.parse()?,
            },
            logging: LoggingSettings {
                level: required(resolved, keys::LOG_LEVEL, Value::as_text)?.parse()?,
                file: required(resolved, keys::LOG_FILE, Value::as_path)?.to_path_buf(),
            },
            api: ApiSettings {
                enabled: required(resolved, keys::API_ENABLED, Value::as_bool)?,
                host: required(resolved, keys::API_HOST, Value::as_text)?.to_string(),
                port: port(required(resolved, keys::API_PORT, Value::as_integer)?)?,
                secret_key: required(resolved, keys::SECRET_KEY, Value::as_secret)?.clone(),
                api_key: optional(resolved, keys::API_KEY, Value::as_secret)?.cloned(),
            },
            pdf: PdfSettings {
                templates_path: required(resolved, keys::PDF_TEMPLATES_PATH, Value::as_path)?
                    .to_path_buf(),
                temp_path: required(resolved, keys::PDF_TEMP_PATH, Value::as_path)?
                    .to_path_buf(),
            },
            paths: PathSettings::from_root(required(resolved, keys::APP_ROOT, Value::as_path)?),
        };

        settings.validate()?;
        info!("Configuration resolved successfully");
        Ok(settings)
    }

    /// Rules spanning more than one field
    fn validate(&self) -> Result<()> {
        if self.telegram.mode == TelegramMode::Webhook && self.telegram.webhook_url.is_none() {
            return Err(Error::missing(keys::TELEGRAM_WEBHOOK_URL));
        }

        if self.api.enabled && self.api.uses_default_secret() {
            warn!(
                "{} uses the default secret key while the API is enabled",
                keys::SECRET_KEY
            );
        }

        Ok(())
    }

    pub fn telegram(&self) -> &TelegramSettings {
        &self.telegram
    }

    pub fn trello(&self) -> &TrelloSettings {
        &self.trello
    }

    pub fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub fn report(&self) -> &ReportSettings {
        &self.report
    }

    pub fn language(&self) -> &LanguageSettings {
        &self.language
    }

    pub fn logging(&self) -> &LoggingSettings {
        &self.logging
    }

    pub fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub fn pdf(&self) -> &PdfSettings {
        &self.pdf
    }

    pub fn paths(&self) -> &PathSettings {
        &self.paths
    }
}

fn required<'a, T>(
    resolved: &'a Resolved,
    name: &str,
    pick: impl FnOnce(&'a Value) -> Option<T>,
) -> Result<T> {
    optional(resolved, name, pick)?.ok_or_else(|| Error::missing(name))
}

fn optional<'a, T>(
    resolved: &'a Resolved,
    name: &str,
    pick: impl FnOnce(&'a Value) -> Option<T>,
) -> Result<Option<T>> {
    match resolved.get(name) {
        None => Ok(None),
        Some(value) => pick(value)
            .map(Some)
            .ok_or_else(|| Error::internal(format!("field {name} resolved to an unexpected kind"))),
    }
}

fn port(value: i64) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| Error::invalid(keys::API_PORT, value.to_string(), "port out of range"))
}
