//! IPv6 rotation list.
//!
//! # Data Flow
//! ```text
//! Bootstrap:  base + siblings → list_file.rs (truncate, one per line)
//! Consumer:   list file → pool.rs (load, shuffle, per-request rotation)
//! ```

pub mod list_file;
pub mod pool;

pub use list_file::ListWriter;
pub use pool::{AddressPool, Rotation};
