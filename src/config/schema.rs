//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bootstrap.
//! All types derive Serde traits for deserialization from config files.
//! Defaults reproduce the constants the container image has always shipped with.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the bootstrap sequence.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Interface resolution and startup delay.
    pub network: NetworkConfig,

    /// Global address discovery retry budget.
    pub discovery: DiscoveryConfig,

    /// Address generation and the persisted list.
    pub rotation: RotationConfig,

    /// Application server launched at handoff.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Seconds to wait before touching the network stack.
    pub startup_delay_secs: u64,

    /// Use this interface instead of resolving one.
    pub interface: Option<String>,

    /// Path to the iproute2 binary.
    pub ip_binary: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            startup_delay_secs: 5,
            interface: None,
            ip_binary: "ip".to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }
}

/// Discovery retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum number of polls for a global address.
    pub max_attempts: u32,

    /// Fixed delay between polls in seconds.
    pub retry_interval_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_interval_secs: 3,
        }
    }
}

/// Address generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Total list size, base address included.
    pub address_count: u16,

    /// Suffix of the first generated sibling.
    pub first_suffix: u16,

    /// Prefix length used when assigning addresses.
    pub prefix_len: u8,

    /// Where the address list is written.
    pub list_file: PathBuf,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            address_count: 200,
            first_suffix: 2,
            prefix_len: 64,
            list_file: PathBuf::from("/app/ipv6_ips.txt"),
        }
    }
}

/// Server handoff configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Program to exec.
    pub program: String,

    /// Leading arguments (e.g. the ASGI application path).
    pub args: Vec<String>,

    /// Bind host passed as `--host`.
    pub host: String,

    /// Port passed as `--port`.
    pub port: u16,

    /// Worker count passed as `--workers`.
    pub workers: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            program: "uvicorn".to_string(),
            args: vec!["app:app".to_string()],
            host: "0.0.0.0".to_string(),
            port: 7860,
            workers: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format: "pretty", "compact" or "json".
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "compact".to_string(),
        }
    }
}
