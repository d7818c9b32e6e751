//! IPv6 Rotation Bootstrap Library

pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod rotation;

pub use config::schema::BootstrapConfig;
pub use lifecycle::{run_and_handoff, Bootstrap, BootstrapReport, ExecLauncher, Launcher};
pub use net::{IpCommand, NetworkOps};
pub use rotation::AddressPool;
