//! Configuration check binary for the SAMI Weekly Reports system
//!
//! Resolves the configuration from the same sources the application uses and
//! exits non-zero when it is incomplete or invalid.
//!
//! # Usage
//!
//! ```bash
//! sami-config --config /etc/sami/config.toml --set API_PORT=8080 --explain
//! ```

use clap::Parser;
use sami_reports_config::cli::{CheckArgs, check::parse_override, run_check_mode};
use std::path::PathBuf;

/// Validate SAMI Weekly Reports configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (must exist when given)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Dotenv file to read instead of ./.env (must exist when given)
    #[arg(long, value_name = "FILE", conflicts_with = "no_env_file")]
    env_file: Option<PathBuf>,

    /// Do not read any dotenv file
    #[arg(long)]
    no_env_file: bool,

    /// Explicit KEY=VALUE override, highest precedence (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    set: Vec<(String, String)>,

    /// Print the resolved settings as JSON, secrets redacted
    #[arg(long)]
    print: bool,

    /// Show where every value came from
    #[arg(long)]
    explain: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for CheckArgs {
    fn from(cli: Cli) -> Self {
        Self {
            config: cli.config,
            env_file: cli.env_file,
            no_env_file: cli.no_env_file,
            overrides: cli.set,
            print: cli.print,
            explain: cli.explain,
            verbose: cli.verbose,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_check_mode(cli.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["sami-config"]);
        assert_eq!(cli.config, None);
        assert!(cli.set.is_empty());
        assert!(!cli.print);
        assert!(!cli.explain);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_custom_values() {
        let cli = Cli::parse_from([
            "sami-config",
            "--config",
            "/etc/sami/config.toml",
            "--set",
            "api_port=8080",
            "-s",
            "LOG_LEVEL=debug",
            "--explain",
            "-v",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/sami/config.toml")));
        assert_eq!(
            cli.set,
            vec![
                ("API_PORT".to_string(), "8080".to_string()),
                ("LOG_LEVEL".to_string(), "debug".to_string()),
            ]
        );
        assert!(cli.explain);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_malformed_override() {
        assert!(Cli::try_parse_from(["sami-config", "--set", "API_PORT"]).is_err());
    }

    #[test]
    fn test_cli_env_file_conflicts_with_no_env_file() {
        assert!(
            Cli::try_parse_from(["sami-config", "--env-file", "a.env", "--no-env-file"]).is_err()
        );
    }
}
