//! Configuration check mode
//!
//! Resolves the configuration exactly as the application does at startup and
//! reports the outcome, so a broken deployment fails before anything runs.

use crate::config::schema::{self, keys};
use crate::config::{self, ConfigLoader, LoadOptions, LogLevel, Resolved, default_config_path};
use crate::logging;
use anyhow::Result;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::debug;

/// Arguments for check mode
#[derive(Debug, Default)]
pub struct CheckArgs {
    /// Mandatory TOML config file; the platform default is read if present otherwise
    pub config: Option<PathBuf>,
    /// Mandatory dotenv file replacing `./.env`
    pub env_file: Option<PathBuf>,
    pub no_env_file: bool,
    pub overrides: Vec<(String, String)>,
    /// Print the resolved settings as JSON
    pub print: bool,
    /// Print where every value came from
    pub explain: bool,
    pub verbose: bool,
}

impl CheckArgs {
    pub fn load_options(&self) -> LoadOptions {
        let mut options = match (&self.config, default_config_path()) {
            (Some(path), _) => LoadOptions::new().with_config_file(path),
            (None, Some(path)) => LoadOptions::new().with_optional_config_file(path),
            (None, None) => LoadOptions::new(),
        };

        if self.no_env_file {
            options = options.without_env_file();
        } else if let Some(path) = &self.env_file {
            options = options.with_env_file(path);
        }

        for (key, value) in &self.overrides {
            options = options.with_override(key, value);
        }
        options
    }
}

/// Parse a `KEY=VALUE` override; keys are upper-cased
pub fn parse_override(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("override key must not be empty".to_string());
    }
    Ok((key.to_ascii_uppercase(), value.to_string()))
}

/// Render one line per resolved field in declaration order: name, value, origin
pub fn render_origins(resolved: &Resolved) -> String {
    let mut out = String::new();
    for spec in schema::FIELDS {
        let (Some(value), Some(origin)) = (resolved.get(spec.name), resolved.origin(spec.name))
        else {
            continue;
        };
        let value = value.to_string();
        let _ = writeln!(out, "{:<22} {value:<32} {origin}", spec.name);
    }
    out
}

/// Level from a resolution, `warn` when it failed
fn configured_level(resolved: &crate::Result<Resolved>) -> LogLevel {
    resolved
        .as_ref()
        .ok()
        .and_then(|resolved| resolved.get(keys::LOG_LEVEL))
        .and_then(|value| value.as_text())
        .and_then(|level| level.parse().ok())
        .unwrap_or(LogLevel::Warn)
}

/// Run check mode with the given arguments
pub fn run_check_mode(args: CheckArgs) -> Result<()> {
    let options = args.load_options();

    // LOG_LEVEL is itself configuration: this pass runs before any subscriber
    // exists and only feeds the log level and --explain.
    let resolved = ConfigLoader::new(options.clone()).resolve(schema::FIELDS);
    logging::init_logging(configured_level(&resolved), args.verbose)?;

    let settings = config::init(&options)?;
    debug!("Process configuration state: {:?}", config::state());

    if args.explain {
        print!("{}", render_origins(&resolved?));
    }
    if args.print {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    }
    if !args.explain && !args.print {
        println!("Configuration OK");
    }

    Ok(())
}
