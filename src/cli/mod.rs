mod params;

use tracing_subscriber::EnvFilter;

pub use params::{Mode, Params, Usage};

/// Logs go to stderr; stdout carries records in consume mode.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
