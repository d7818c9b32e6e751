//! Global IPv6 address discovery.
//!
//! Polls the interface for a stable global address. Privacy-extension and
//! not-yet-usable addresses are skipped, since rotating siblings must hang
//! off an address that stays put for the life of the container.

use std::net::Ipv6Addr;

use crate::net::ops::NetworkOps;
use crate::resilience::{retry_until_some, RetryPolicy};

/// Address flags that disqualify a base address.
const EXCLUDED_FLAGS: &[&str] = &["temporary", "mngtmpaddr", "tentative", "dadfailed", "deprecated"];

/// One `inet6` entry from `ip -6 -o addr show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub addr: Ipv6Addr,
    pub prefix_len: u8,
    pub flags: Vec<String>,
}

impl InterfaceAddress {
    /// Usable as a rotation base.
    pub fn is_stable(&self) -> bool {
        !self.flags.iter().any(|f| EXCLUDED_FLAGS.contains(&f.as_str()))
    }
}

/// Parse `ip -6 -o addr show dev <if> scope global` output.
///
/// Example line:
/// `2: eth0    inet6 2001:db8::5/64 scope global dynamic mngtmpaddr \       valid_lft 86390sec ...`
pub fn parse_global_addresses(output: &str) -> Vec<InterfaceAddress> {
    output.lines().filter_map(parse_addr_line).collect()
}

fn parse_addr_line(line: &str) -> Option<InterfaceAddress> {
    let mut tokens = line.split_whitespace();
    tokens.find(|t| *t == "inet6")?;

    let (addr, prefix_len) = tokens.next()?.split_once('/')?;
    let addr: Ipv6Addr = addr.parse().ok()?;
    let prefix_len: u8 = prefix_len.parse().ok()?;

    tokens.find(|t| *t == "scope")?;
    if tokens.next()? != "global" {
        return None;
    }

    let flags = tokens
        .take_while(|t| *t != "\\" && !t.starts_with("valid_lft"))
        .map(str::to_string)
        .collect();

    Some(InterfaceAddress {
        addr,
        prefix_len,
        flags,
    })
}

/// Pick the first stable global address from a listing.
pub fn select_base_address(addresses: &[InterfaceAddress]) -> Option<Ipv6Addr> {
    addresses.iter().find(|a| a.is_stable()).map(|a| a.addr)
}

/// Poll `iface` until a stable global address appears or the budget runs out.
///
/// On exhaustion the interface's state is logged and `None` is returned.
pub async fn discover_base_address(
    ops: &dyn NetworkOps,
    iface: &str,
    policy: RetryPolicy,
) -> Option<Ipv6Addr> {
    let found = retry_until_some(policy, |attempt| async move {
        match ops.global_addresses(iface).await {
            Ok(addresses) => {
                let base = select_base_address(&addresses);
                match base {
                    Some(addr) => {
                        tracing::info!(interface = %iface, address = %addr, attempt, "Found global IPv6 address");
                    }
                    None => tracing::info!(
                        interface = %iface,
                        attempt,
                        max_attempts = policy.max_attempts,
                        candidates = addresses.len(),
                        "No stable global IPv6 address yet"
                    ),
                }
                base
            }
            Err(e) => {
                tracing::warn!(interface = %iface, attempt, error = %e, "Address listing failed");
                None
            }
        }
    })
    .await;

    if found.is_none() {
        let diagnostics = ops.diagnostics(iface).await;
        tracing::warn!(
            interface = %iface,
            attempts = policy.max_attempts,
            "Gave up waiting for a global IPv6 address, continuing without rotation"
        );
        for line in diagnostics.lines() {
            tracing::warn!(target: "ipv6_bootstrap::diagnostics", "{}", line);
        }
    }

    found
}
