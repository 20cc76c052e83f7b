//! SAMI Weekly Reports - Configuration
//!
//! Process-wide configuration for the SAMI Weekly Reports system. Values are
//! resolved once from layered sources, validated, and then shared read-only.
//!
//! # Sources
//!
//! In precedence order:
//! - **Overrides**: explicit key/value pairs
//! - **Environment**: process environment variables
//! - **Dotenv**: `./.env` or another `KEY=VALUE` file
//! - **Config file**: a TOML document
//! - **Defaults**: declared in [`config::schema::FIELDS`]
//!
//! Missing required fields, malformed values and unreadable mandatory sources
//! all abort resolution; a partially valid [`Settings`] never exists.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sami_reports_config::config::{self, LoadOptions};
//!
//! # fn example() -> sami_reports_config::Result<()> {
//! // Startup: resolve once, fail fast
//! let settings = config::init(&LoadOptions::default())?;
//! println!("API listening on {}", settings.api().bind_address());
//!
//! // Anywhere later: the same instance
//! let same = sami_reports_config::settings()?;
//! assert!(std::ptr::eq(settings, same));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub use config::{Settings, settings};
pub use error::{Error, Result};
