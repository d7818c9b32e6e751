//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the output format and level from config
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for log shippers, compact or pretty for humans
//! - `RUST_LOG` overrides the configured level when set
//! - Events go to stderr; stdout carries only command output

use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Build the filter: `RUST_LOG` if set, else `ipv6_bootstrap=<level>`.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ipv6_bootstrap={}", config.log_level)))
}

/// Install the global subscriber. Safe to call once per process.
pub fn init_logging(config: &ObservabilityConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    // stdout is reserved for command output (`plan`, `pool`).
    let result = match config.log_format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().pretty().with_writer(io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("ipv6-bootstrap: logging already initialized: {}", e);
    }
}
