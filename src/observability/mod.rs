//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!
//! Consumers:
//!     → container stdout/stderr (docker logs, platform log viewer)
//! ```
//!
//! # Design Decisions
//! - Structured fields (interface, address, attempt) on every event
//! - Diagnostics dumps go to their own target so they can be filtered

pub mod logging;

pub use logging::init_logging;
