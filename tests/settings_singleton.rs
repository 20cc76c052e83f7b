//! Process singleton behaviour on successful resolution
//!
//! Each integration test file runs as its own process, so this file owns the
//! singleton. Keep it to a single test.

mod common;

use common::helpers::TEST_TOKEN;
use sami_reports_config::config::{self, LoadOptions, ResolutionState};

#[test]
fn test_singleton_resolves_once_and_is_shared() {
    assert_eq!(config::state(), ResolutionState::Unresolved);

    let options = LoadOptions::new()
        .without_environment()
        .without_env_file()
        .with_override("TELEGRAM_BOT_TOKEN", TEST_TOKEN)
        .with_override("API_PORT", "8080");
    let first = config::init(&options).unwrap();
    assert_eq!(config::state(), ResolutionState::Resolved);
    assert_eq!(first.api().port, 8080);

    // Later accesses return the identical instance
    let second = sami_reports_config::settings().unwrap();
    assert!(std::ptr::eq(first, second));

    // Re-initializing with other options does not re-resolve
    let other = LoadOptions::new()
        .without_environment()
        .without_env_file()
        .with_override("TELEGRAM_BOT_TOKEN", TEST_TOKEN)
        .with_override("API_PORT", "9999");
    let third = config::init(&other).unwrap();
    assert!(std::ptr::eq(first, third));
    assert_eq!(third.api().port, 8080);

    // Concurrent readers share it without locking
    let addresses: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let settings = sami_reports_config::settings().unwrap();
                    settings as *const _ as usize
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(addresses.iter().all(|&addr| addr == first as *const _ as usize));
}
