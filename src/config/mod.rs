//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → BootstrapConfig (validated, immutable)
//!     → passed by reference to the sequencer and handoff
//! ```
//!
//! # Design Decisions
//! - Config is read once per container start; there is no reload
//! - All fields have defaults so the image boots without a file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{config_path, load_config, load_or_fallback, ConfigError};
pub use schema::BootstrapConfig;
pub use schema::{DiscoveryConfig, NetworkConfig, ObservabilityConfig, RotationConfig, ServerConfig};
