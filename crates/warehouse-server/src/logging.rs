//! Log setup shared by the server and client binaries.
//!
//! Logs always go to stderr: stdout carries console replies, the port lines
//! and client responses.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter for the subscriber: `debug` with `--debug`, otherwise `RUST_LOG`
/// if set and valid, otherwise `info`.
pub fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the compact stderr subscriber.
pub fn init_logging(debug: bool) {
    FmtSubscriber::builder()
        .with_env_filter(log_filter(debug))
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
