//! Configuration loading utilities
//!
//! Assembles the configuration sources in precedence order and resolves them
//! into [`Settings`].

use crate::config::resolver::{self, Resolved};
use crate::config::schema::{self, FieldSpec};
use crate::config::source::Source;
use crate::{Result, config::Settings};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Dotenv file read from the working directory unless told otherwise
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Which sources to read and how strict to be about them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Explicit values, highest precedence
    pub overrides: BTreeMap<String, String>,
    /// Whether to snapshot the process environment
    pub read_environment: bool,
    pub env_file: Option<PathBuf>,
    /// Fail when `env_file` does not exist
    pub env_file_required: bool,
    /// TOML config file, lowest-precedence source above defaults
    pub config_file: Option<PathBuf>,
    /// Fail when `config_file` does not exist
    pub config_file_required: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            overrides: BTreeMap::new(),
            read_environment: true,
            env_file: Some(PathBuf::from(DEFAULT_ENV_FILE)),
            env_file_required: false,
            config_file: None,
            config_file_required: false,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Read a mandatory TOML config file
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self.config_file_required = true;
        self
    }

    /// Read a TOML config file if it exists
    pub fn with_optional_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self.config_file_required = false;
        self
    }

    /// Read a mandatory dotenv file instead of `./.env`
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self.env_file_required = true;
        self
    }

    pub fn without_env_file(mut self) -> Self {
        self.env_file = None;
        self.env_file_required = false;
        self
    }

    pub fn without_environment(mut self) -> Self {
        self.read_environment = false;
        self
    }
}

/// Default location of the TOML config file, `<config dir>/sami-reports/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sami-reports").join("config.toml"))
}

/// Configuration loader with multiple source support
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    options: LoadOptions,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Read all sources in precedence order:
    /// 1. Explicit overrides (highest priority)
    /// 2. Environment variables
    /// 3. Dotenv file
    /// 4. Configuration file
    ///
    /// Defaults from the schema come last and are applied by the resolver.
    pub fn sources(&self) -> Result<Vec<Source>> {
        let mut sources = vec![Source::overrides(self.options.overrides.clone())];

        if self.options.read_environment {
            debug!("Reading environment variables");
            sources.push(Source::environment());
        }

        if let Some(path) = &self.options.env_file {
            sources.push(Source::dotenv(path, self.options.env_file_required)?);
        }

        if let Some(path) = &self.options.config_file {
            info!("Loading configuration from file: {:?}", path);
            sources.push(Source::toml_file(path, self.options.config_file_required)?);
        }

        Ok(sources)
    }

    /// Resolve an arbitrary schema against the configured sources
    pub fn resolve(&self, schema: &[FieldSpec]) -> Result<Resolved> {
        let sources = self.sources()?;
        resolver::resolve(&sources, schema)
    }

    /// Load and validate the application settings
    pub fn load(&self) -> Result<Settings> {
        let resolved = self.resolve(schema::FIELDS)?;
        let settings = Settings::from_resolved(&resolved)?;
        debug!("Final configuration: {:?}", settings);
        Ok(settings)
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::config::schema::keys;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TOKEN: &str = "123456789:loader-test-token";

    fn isolated() -> LoadOptions {
        LoadOptions::new().without_environment().without_env_file()
    }

    #[test]
    fn test_load_defaults() {
        let loader = ConfigLoader::new(isolated().with_override(keys::TELEGRAM_BOT_TOKEN, TOKEN));
        let settings = loader.load().unwrap();

        assert_eq!(settings.api().port, 3000);
        assert_eq!(settings.telegram().bot_token.expose(), TOKEN);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
telegram_bot_token = "{TOKEN}"

[api]
host = "localhost"
port = 8080

[report]
deadline_time = "17:30"
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new(isolated().with_config_file(temp_file.path()));
        let settings = loader.load().unwrap();

        assert_eq!(settings.api().host, "localhost");
        assert_eq!(settings.api().port, 8080);
        assert_eq!(
            settings.report().deadline_time,
            chrono::NaiveTime::from_hms_opt(17, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_precedence_across_layers() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(config_file, "API_PORT = 1111\nAPI_HOST = \"10.0.0.1\"\nLOG_LEVEL = \"warn\"")
            .unwrap();
        let mut env_file = NamedTempFile::new().unwrap();
        writeln!(
            env_file,
            "TELEGRAM_BOT_TOKEN={TOKEN}\nAPI_PORT=2222\nAPI_HOST=10.0.0.2"
        )
        .unwrap();

        let options = isolated()
            .with_env_file(env_file.path())
            .with_config_file(config_file.path())
            .with_override(keys::API_PORT, "3333");
        let loader = ConfigLoader::new(options);
        let resolved = loader.resolve(schema::FIELDS).unwrap();
        let settings = Settings::from_resolved(&resolved).unwrap();

        // override > dotenv > file > default
        assert_eq!(settings.api().port, 3333);
        assert_eq!(settings.api().host, "10.0.0.2");
        assert_eq!(settings.logging().level.as_str(), "warn");
        assert_eq!(settings.pdf().temp_path, PathBuf::from("./temp/pdf"));
        assert_eq!(
            resolved.origin(keys::LOG_LEVEL).unwrap().to_string(),
            format!("file ({})", config_file.path().display())
        );
    }

    #[test]
    fn test_missing_mandatory_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = isolated()
            .with_override(keys::TELEGRAM_BOT_TOKEN, TOKEN)
            .with_config_file(dir.path().join("missing.toml"));

        let err = ConfigLoader::new(options).load().unwrap_err();
        assert!(matches!(err, Error::UnknownSource { .. }));
    }

    #[test]
    fn test_missing_optional_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = isolated()
            .with_override(keys::TELEGRAM_BOT_TOKEN, TOKEN)
            .with_optional_config_file(dir.path().join("missing.toml"));

        assert!(ConfigLoader::new(options).load().is_ok());
    }

    #[test]
    fn test_sources_order() {
        let env_file = NamedTempFile::new().unwrap();
        let config_file = NamedTempFile::new().unwrap();
        let options = LoadOptions::new()
            .with_env_file(env_file.path())
            .with_config_file(config_file.path());

        let kinds: Vec<_> = ConfigLoader::new(options)
            .sources()
            .unwrap()
            .iter()
            .map(Source::kind)
            .collect();

        use crate::config::SourceKind::*;
        assert_eq!(kinds, vec![Override, Environment, DotEnv, File]);
    }

    #[test]
    fn test_default_options() {
        let options = LoadOptions::default();
        assert!(options.read_environment);
        assert_eq!(options.env_file, Some(PathBuf::from(DEFAULT_ENV_FILE)));
        assert!(!options.env_file_required);
        assert_eq!(options.config_file, None);
    }

    #[test]
    fn test_default_config_path_layout() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("sami-reports/config.toml"));
        }
    }
}
