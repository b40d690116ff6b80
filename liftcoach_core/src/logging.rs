//! Logging setup shared by the liftcoach binaries and tests.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the default subscriber at INFO
///
/// `RUST_LOG` overrides the level, e.g. `RUST_LOG=liftcoach_core=debug`
/// shows every progression and split decision.
pub fn init() {
    init_with_level("info")
}

/// Install the subscriber with a specific default level
///
/// # Arguments
/// * `default_level` - Filter directive used when `RUST_LOG` is unset
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route logs to the test harness; safe to call from every test
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
