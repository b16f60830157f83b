//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use stream_expect::ExpectConfig;

/// Install a subscriber writing through the test harness.
///
/// Set `RUST_LOG=stream_expect=trace` to see the expect loop.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Configuration with the given capacity and a short timeout.
pub fn config(capacity: usize) -> ExpectConfig {
    ExpectConfig::new()
        .capacity(capacity)
        .timeout(Duration::from_secs(2))
}
