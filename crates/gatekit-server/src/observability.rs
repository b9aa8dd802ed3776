//! Tracing setup.
//!
//! Configuration is loaded once at startup, so the subscriber is installed
//! once with the configured level. A set `RUST_LOG` wins over the config
//! value, letting operators raise verbosity per target without touching
//! `gatekit.toml`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_tracing(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(log_filter(level))
        .with(fmt::layer())
        .try_init();
}

fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
