//! Tracing subscriber setup.
//!
//! Logs always go to stderr: stdout carries protocol messages when running
//! `semx serve stdio`, and command output otherwise.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Resolve the filter directive: `RUST_LOG`, then `--verbose`, then config.
pub fn filter_directive(config: &Config, verbose: bool) -> String {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !env.trim().is_empty() {
            return env;
        }
    }
    if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(config: &Config, verbose: bool) {
    let directive = filter_directive(config, verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{}': {}; using 'info'", directive, e);
        EnvFilter::new("info")
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
