//! Configuration management for the SAMI Weekly Reports system
//!
//! This module resolves the process-wide [`Settings`] from layered sources
//! (overrides, environment, dotenv file, TOML file, defaults) and keeps the
//! result in a process singleton.
//!
//! The entry point calls [`init`] once at startup and hands `&Settings` to the
//! components that need it. [`settings`] returns the same instance afterwards,
//! resolving with [`LoadOptions::default`] if nothing initialized it yet.
//! Resolution runs at most once per process; its outcome, success or failure,
//! is final.

pub mod loader;
pub mod resolver;
pub mod schema;
mod sections;
pub mod source;
pub mod value;

pub use loader::{ConfigLoader, LoadOptions, default_config_path};
pub use resolver::{Origin, Resolved, ResolvedField, resolve};
pub use schema::{FieldKind, FieldSpec};
pub use sections::{
    AdminSettings, ApiSettings, DatabaseSettings, Language, LanguageSettings, LogLevel,
    LoggingSettings, PathSettings, PdfSettings, ReportSettings, Settings, TelegramMode,
    TelegramSettings, TrelloSettings,
};
pub use source::{Source, SourceKind};
pub use value::{Secret, Value};

use crate::Result;
use std::sync::OnceLock;
use tracing::{debug, info};

static SETTINGS: OnceLock<Result<Settings>> = OnceLock::new();

/// Lifecycle of the process singleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolved,
    Failed,
}

/// Resolve the process settings once, at startup
///
/// Concurrent callers block until the first resolution finishes. Later calls
/// return the outcome of that first resolution and ignore `options`.
pub fn init(options: &LoadOptions) -> Result<&'static Settings> {
    let mut resolved_now = false;
    let outcome = SETTINGS.get_or_init(|| {
        resolved_now = true;
        info!("Resolving process configuration");
        Settings::load(options)
    });
    if !resolved_now {
        debug!("Configuration already resolved, reusing the existing outcome");
    }
    outcome.as_ref().map_err(Clone::clone)
}

/// The process settings
///
/// Returns the identical instance on every call.
pub fn settings() -> Result<&'static Settings> {
    match SETTINGS.get() {
        Some(outcome) => outcome.as_ref().map_err(Clone::clone),
        None => init(&LoadOptions::default()),
    }
}

/// Current state of the process singleton
pub fn state() -> ResolutionState {
    match SETTINGS.get() {
        None => ResolutionState::Unresolved,
        Some(Ok(_)) => ResolutionState::Resolved,
        Some(Err(_)) => ResolutionState::Failed,
    }
}
