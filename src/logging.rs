//! `env_logger` setup for binaries and tests embedding the table.

use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Install a timestamped logger at `info` (`RUST_LOG` overrides). Safe to
/// call any number of times; a logger installed elsewhere is left in place.
pub fn init_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("record_table", LevelFilter::Info)
            .format_timestamp_millis()
            .parse_default_env();

        let _ = builder.try_init();
    });
}
