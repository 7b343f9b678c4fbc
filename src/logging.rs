//! Installs the stderr `tracing` subscriber used by the binary.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Default filter directive: warnings only, or debug output when `verbose`.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Installs a global fmt subscriber writing to stderr. `RUST_LOG`, when set,
/// overrides the level chosen from `verbose`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A subscriber may already be installed when embedded in another program.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
