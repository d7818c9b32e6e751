//! Host network subsystem.
//!
//! # Data Flow
//! ```text
//! ops.rs (NetworkOps: ip route / ip link / ip addr)
//!     → interface.rs (default route, fallback to first non-loopback link)
//!     → address.rs (poll for a stable global IPv6 address)
//!     → prefix.rs (derive /64, generate <prefix>::<n> siblings)
//! ```
//!
//! # Design Decisions
//! - Parsing is pure and separate from process spawning
//! - Every lookup failure collapses to "not found" at this layer's edge

pub mod address;
pub mod interface;
pub mod ops;
pub mod prefix;

pub use address::{discover_base_address, InterfaceAddress};
pub use interface::{resolve_interface, Link};
pub use ops::{AssignmentOutcome, IpCommand, NetError, NetworkOps};
pub use prefix::{generate_siblings, Prefix64};
