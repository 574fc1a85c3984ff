//! Logger setup shared by the CLI and the test suites.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// At Debug the service logs one line per classification outcome, every
/// landing and float step, cache invalidations and a summary of each tick.
/// Info adds bump traces only while the blink flag is set; errors cover
/// out-of-bounds recoveries and oversized floaters. When `verbose` is
/// `false` only Info and above are shown. `RUST_LOG` overrides either
/// default.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    // `try_init` only fails if a logger was already set; tests call `init`
    // repeatedly.
    if builder.try_init().is_err() {
        log::trace!("logger already initialised");
    }
}
