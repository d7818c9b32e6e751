//! Active interface resolution.
//!
//! # Responsibilities
//! - Parse `ip route show default` and `ip -o link show` output
//! - Pick the interface outbound traffic leaves through
//!
//! # Design Decisions
//! - Order: configured override, default route, first non-loopback link
//! - Lookup failures are logged and treated as "nothing found"

use crate::net::ops::NetworkOps;

/// One line of `ip -o link show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub index: u32,
    pub name: String,
    pub flags: Vec<String>,
}

impl Link {
    pub fn is_loopback(&self) -> bool {
        self.name == "lo" || self.flags.iter().any(|f| f == "LOOPBACK")
    }
}

/// Extract the `dev` of the first default route line.
pub fn parse_default_route(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.trim_start().starts_with("default"))
        .find_map(|line| {
            let mut tokens = line.split_whitespace();
            tokens.find(|t| *t == "dev")?;
            tokens.next().map(str::to_string)
        })
}

/// Parse `ip -o link show`: `2: eth0@if7: <BROADCAST,UP,LOWER_UP> mtu 1500 ...`.
pub fn parse_links(output: &str) -> Vec<Link> {
    output.lines().filter_map(parse_link_line).collect()
}

fn parse_link_line(line: &str) -> Option<Link> {
    let mut parts = line.splitn(3, ": ");
    let index = parts.next()?.trim().parse().ok()?;
    let raw_name = parts.next()?.trim();
    let rest = parts.next().unwrap_or_default();

    // Veth peers print as `eth0@if7`; the device name stops at '@'.
    let name = raw_name.split('@').next().unwrap_or(raw_name).to_string();
    if name.is_empty() {
        return None;
    }

    let flags = rest
        .strip_prefix('<')
        .and_then(|r| r.split_once('>'))
        .map(|(flags, _)| {
            flags
                .split(',')
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Link { index, name, flags })
}

/// Resolve the interface to configure, or `None` if the host has none.
pub async fn resolve_interface(ops: &dyn NetworkOps, configured: Option<&str>) -> Option<String> {
    if let Some(name) = configured {
        tracing::info!(interface = %name, "Using configured interface");
        return Some(name.to_string());
    }

    match ops.default_route_interface().await {
        Ok(Some(name)) => {
            tracing::info!(interface = %name, "Interface resolved from default route");
            return Some(name);
        }
        Ok(None) => tracing::debug!("No default route, falling back to link enumeration"),
        Err(e) => tracing::warn!(error = %e, "Default route lookup failed, falling back to link enumeration"),
    }

    match ops.links().await {
        Ok(links) => {
            let found = links.into_iter().find(|l| !l.is_loopback()).map(|l| l.name);
            match &found {
                Some(name) => tracing::info!(interface = %name, "Interface resolved from link list"),
                None => tracing::warn!("No non-loopback interface found"),
            }
            found
        }
        Err(e) => {
            tracing::warn!(error = %e, "Link enumeration failed");
            None
        }
    }
}
