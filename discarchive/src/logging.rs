//! Logging initialization for the `discarchive` front-end.
//!
//! Events from both this binary and `discarchive-core` go to stderr, so they never
//! interleave with the prompts and progress bars on stdout.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for the logging system.
#[derive(Default)]
pub struct LogConfig {
    /// Output logs as JSON lines.
    pub json: bool,
    /// Set the default level to DEBUG.
    pub verbose: bool,
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the level chosen from `config.verbose`.
pub fn init(config: LogConfig) {
    let default_level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let level = default_level.as_str().to_lowercase();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("discarchive={level},discarchive_core={level}"))
    });

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init();
    }
}
