//! Process-wide log setup.
//!
//! trellis itself only emits `tracing` events; installing a subscriber is
//! the binary's job. [`init`] is the one-liner for services that want the
//! usual fmt output.

use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;

/// Installs a fmt subscriber. `RUST_LOG` wins when set; otherwise
/// `config.log_level` is used.
///
/// Calling it twice is harmless: the second call leaves the first
/// subscriber in place and returns `false`.
pub fn init(config: &ServiceConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
