//! Log output for the binary.
//!
//! Library code logs through the `log` facade; the subscriber installed here
//! forwards those records to stderr.

use tracing_subscriber::EnvFilter;

/// Filter directive implied by the `-v` and `-q` flags.
#[must_use]
pub const fn level_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set and valid, takes precedence over the flags.
pub fn init(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(verbosity, quiet)));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .try_init();
    if installed.is_err() {
        log::debug!("a log subscriber is already installed");
    }
}
