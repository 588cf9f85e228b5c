use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Install the process-wide logger once; `RUST_LOG` takes precedence.
pub fn initialize_logger(verbose: bool) {
    INIT.call_once_force(|_| {
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        let mut builder = Builder::new();
        builder
            .filter_level(level)
            .filter_module("meterwatch_core", level)
            .format_timestamp_millis()
            .parse_default_env();

        let _ = builder.try_init();
    });
}
