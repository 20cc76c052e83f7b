//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

/// Test helper functions
pub mod helpers {
    use assert_cmd::Command;
    use assert_cmd::cargo::cargo_bin_cmd;
    use std::path::{Path, PathBuf};

    /// A bot token long enough to pass validation
    pub const TEST_TOKEN: &str = "123456789:integration-test-token";

    /// `sami-config` with an empty environment, running inside `workdir`
    ///
    /// The platform config directory points into `workdir` so no real user
    /// configuration leaks into the test.
    pub fn sami_config(workdir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("sami-config");
        cmd.env_clear()
            .current_dir(workdir)
            .env("HOME", workdir)
            .env("XDG_CONFIG_HOME", workdir.join("xdg"));
        cmd
    }

    /// Write `contents` to `name` inside `dir`
    pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}
