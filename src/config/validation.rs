//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (counts > 0, last suffix fits in one group)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BootstrapConfig → Result<(), Vec<ValidationError>>

use crate::config::schema::BootstrapConfig;
use crate::net::prefix::MAX_SUFFIX;
use thiserror::Error;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("discovery.max_attempts must be at least 1")]
    NoDiscoveryAttempts,

    #[error("rotation.address_count must be at least 1")]
    EmptyRotation,

    #[error("rotation.first_suffix must be at least 1 (got {0})")]
    InvalidFirstSuffix(u16),

    #[error("rotation suffixes overflow: first_suffix {first} with address_count {count} runs past {max}", max = MAX_SUFFIX)]
    SuffixOverflow { first: u16, count: u16 },

    #[error("rotation.prefix_len must be between 1 and 128 (got {0})")]
    InvalidPrefixLen(u8),

    #[error("rotation.list_file must not be empty")]
    EmptyListFile,

    #[error("server.program must not be empty")]
    EmptyServerProgram,

    #[error("server.workers must be at least 1")]
    NoWorkers,

    #[error("unknown log format '{0}' (expected pretty, compact or json)")]
    UnknownLogFormat(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &BootstrapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.discovery.max_attempts == 0 {
        errors.push(ValidationError::NoDiscoveryAttempts);
    }

    let rotation = &config.rotation;
    if rotation.address_count == 0 {
        errors.push(ValidationError::EmptyRotation);
    }
    if rotation.first_suffix == 0 {
        errors.push(ValidationError::InvalidFirstSuffix(rotation.first_suffix));
    }
    let last_suffix = u32::from(rotation.first_suffix) + u32::from(rotation.address_count);
    if last_suffix.saturating_sub(2) > u32::from(MAX_SUFFIX) {
        errors.push(ValidationError::SuffixOverflow {
            first: rotation.first_suffix,
            count: rotation.address_count,
        });
    }
    if rotation.prefix_len == 0 || rotation.prefix_len > 128 {
        errors.push(ValidationError::InvalidPrefixLen(rotation.prefix_len));
    }
    if rotation.list_file.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyListFile);
    }

    if config.server.program.trim().is_empty() {
        errors.push(ValidationError::EmptyServerProgram);
    }
    if config.server.workers == 0 {
        errors.push(ValidationError::NoWorkers);
    }

    match config.observability.log_format.as_str() {
        "pretty" | "compact" | "json" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
