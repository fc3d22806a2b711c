//! One-shot `env_logger` setup

use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

/// Guards logger installation
static INIT: Once = Once::new();

/// Installs an `env_logger` at `info` level, overridable through `RUST_LOG`.
///
/// Safe to call repeatedly; only the first call has an effect, and a logger
/// installed elsewhere is left in place.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Info)
            .filter_module("chained_hash", LevelFilter::Info)
            .format_timestamp_millis()
            .parse_default_env();

        let _ = builder.try_init();
    });
}
