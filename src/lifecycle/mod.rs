//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Truncate list → Delay → Resolve interface → Discover base address
//!     → Assign siblings → Write list
//!
//! Handoff (handoff.rs):
//!     Build server command → exec (replaces this process)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: one step at a time, no background tasks
//! - Network steps are best-effort; handoff always happens

pub mod handoff;
pub mod startup;

pub use handoff::{ExecLauncher, HandoffError, Launcher, ServerCommand};
pub use startup::{run_and_handoff, Bootstrap, BootstrapReport};
