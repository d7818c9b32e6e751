//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::BootstrapConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "IPV6_BOOTSTRAP_CONFIG";

/// Environment variable overriding interface resolution.
pub const INTERFACE_ENV: &str = "IPV6_BOOTSTRAP_INTERFACE";

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ipv6-bootstrap.toml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BootstrapConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BootstrapConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Pick the config path: explicit argument, then environment, then the default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration for the entrypoint, which must always get a config.
///
/// A missing file means the shipped defaults. A broken file also yields the
/// defaults, plus the error for the caller to report. Environment overrides
/// apply on every path.
pub fn load_or_fallback(path: &Path) -> (BootstrapConfig, Option<ConfigError>) {
    load_or_fallback_with(path, |key| std::env::var(key).ok())
}

fn load_or_fallback_with<F>(path: &Path, lookup: F) -> (BootstrapConfig, Option<ConfigError>)
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, error) = if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        (BootstrapConfig::default(), None)
    } else {
        match load_config(path) {
            Ok(config) => (config, None),
            Err(e) => (BootstrapConfig::default(), Some(e)),
        }
    };

    apply_env_overrides(&mut config, lookup);
    (config, error)
}

fn apply_env_overrides<F>(config: &mut BootstrapConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(iface) = lookup(INTERFACE_ENV).filter(|v| !v.trim().is_empty()) {
        config.network.interface = Some(iface.trim().to_string());
    }
}
