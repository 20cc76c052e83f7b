//! Command-line interface logic
//!
//! Contains the logic behind the `sami-config` binary.

pub mod check;

pub use check::{CheckArgs, run_check_mode};
