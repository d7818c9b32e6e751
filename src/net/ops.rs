//! Host network operations.
//!
//! # Responsibilities
//! - Define the `NetworkOps` seam used by the bootstrap sequencer
//! - Implement it on top of the iproute2 `ip` binary
//!
//! # Design Decisions
//! - Command output is parsed by the pure functions in `interface.rs` and
//!   `address.rs`; this module only spawns processes and maps exit status
//! - An address that is already present counts as a success, so reruns in
//!   the same network namespace are quiet

use std::fmt;
use std::io;
use std::net::Ipv6Addr;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::net::address::{parse_global_addresses, InterfaceAddress};
use crate::net::interface::{parse_default_route, parse_links, Link};

/// Errors from running host network commands.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("`{command}` exited with {}: {stderr}", exit_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

impl NetError {
    /// Whether the kernel refused the operation for lack of privileges.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            NetError::Spawn { source, .. } => source.kind() == io::ErrorKind::PermissionDenied,
            NetError::CommandFailed { stderr, .. } => {
                let stderr = stderr.to_ascii_lowercase();
                stderr.contains("operation not permitted") || stderr.contains("permission denied")
            }
        }
    }
}

/// Result of assigning one address to the interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Assigned,
    AlreadyPresent,
    Failed(String),
}

impl fmt::Display for AssignmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentOutcome::Assigned => write!(f, "assigned"),
            AssignmentOutcome::AlreadyPresent => write!(f, "already present"),
            AssignmentOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Everything the sequencer needs from the host network stack.
#[async_trait]
pub trait NetworkOps: Send + Sync {
    /// Interface carrying the default route, if any.
    async fn default_route_interface(&self) -> Result<Option<String>, NetError>;

    /// All links known to the host, in kernel index order.
    async fn links(&self) -> Result<Vec<Link>, NetError>;

    /// Global-scope IPv6 addresses on `iface`, flags included.
    async fn global_addresses(&self, iface: &str) -> Result<Vec<InterfaceAddress>, NetError>;

    /// Add `addr/prefix_len` to `iface`.
    async fn add_address(
        &self,
        iface: &str,
        addr: Ipv6Addr,
        prefix_len: u8,
    ) -> Result<AssignmentOutcome, NetError>;

    /// Human-readable dump of the interface state, for logs.
    async fn diagnostics(&self, iface: &str) -> String;
}

/// `NetworkOps` backed by the iproute2 command line.
#[derive(Debug, Clone)]
pub struct IpCommand {
    binary: String,
}

impl IpCommand {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, NetError> {
        let command = format!("{} {}", self.binary, args.join(" "));
        tracing::trace!(%command, "Running network command");

        let output = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| NetError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(NetError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl NetworkOps for IpCommand {
    async fn default_route_interface(&self) -> Result<Option<String>, NetError> {
        let v4 = self.run(&["route", "show", "default"]).await?;
        if let Some(dev) = parse_default_route(&v4) {
            return Ok(Some(dev));
        }

        // IPv6-only hosts have no v4 default route.
        let v6 = self.run(&["-6", "route", "show", "default"]).await?;
        Ok(parse_default_route(&v6))
    }

    async fn links(&self) -> Result<Vec<Link>, NetError> {
        let out = self.run(&["-o", "link", "show"]).await?;
        Ok(parse_links(&out))
    }

    async fn global_addresses(&self, iface: &str) -> Result<Vec<InterfaceAddress>, NetError> {
        let out = self
            .run(&["-6", "-o", "addr", "show", "dev", iface, "scope", "global"])
            .await?;
        Ok(parse_global_addresses(&out))
    }

    async fn add_address(
        &self,
        iface: &str,
        addr: Ipv6Addr,
        prefix_len: u8,
    ) -> Result<AssignmentOutcome, NetError> {
        let cidr = format!("{}/{}", addr, prefix_len);
        match self.run(&["-6", "addr", "add", &cidr, "dev", iface]).await {
            Ok(_) => Ok(AssignmentOutcome::Assigned),
            Err(NetError::CommandFailed { ref stderr, .. }) if stderr.contains("File exists") => {
                Ok(AssignmentOutcome::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }

    async fn diagnostics(&self, iface: &str) -> String {
        let mut report = String::new();
        let commands: [&[&str]; 3] = [
            &["-6", "addr", "show", "dev", iface],
            &["-6", "route", "show"],
            &["link", "show", "dev", iface],
        ];

        for args in commands {
            report.push_str(&format!("$ {} {}\n", self.binary, args.join(" ")));
            match self.run(args).await {
                Ok(out) => report.push_str(&out),
                Err(e) => report.push_str(&format!("<{}>\n", e)),
            }
        }
        report
    }
}
