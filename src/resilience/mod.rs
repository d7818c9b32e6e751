//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Address discovery:
//!     → retries.rs (poll with fixed interval until found or budget spent)
//! ```
//!
//! # Design Decisions
//! - The retry cap is the only timeout in the bootstrap
//! - Running out of attempts degrades the run, it never fails it

pub mod retries;

pub use retries::{retry_until_some, RetryPolicy};
