//! Consumer view of the address list.
//!
//! # Responsibilities
//! - Load the persisted list (one address per line, blanks ignored)
//! - Shuffle it so concurrent requests spread across source addresses
//! - Hand each caller its own rotation order
//!
//! # Design Decisions
//! - A missing or unreadable file is an empty pool, never an error;
//!   callers fall back to the host's default source address
//! - Lines that do not parse as IPv6 are dropped with a warning

use std::collections::VecDeque;
use std::fs;
use std::net::Ipv6Addr;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

/// Source addresses available for outbound requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPool {
    addresses: Vec<Ipv6Addr>,
}

impl AddressPool {
    /// Load the list written by the bootstrap. Order is preserved.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "IPv6 address list not readable, rotation disabled"
                );
                return Self::default();
            }
        };

        let pool = Self::parse(&content);
        if pool.is_empty() {
            tracing::warn!(path = %path.display(), "No IPv6 addresses loaded, using default network behavior");
        } else {
            tracing::info!(path = %path.display(), count = pool.len(), "Loaded IPv6 addresses");
        }
        pool
    }

    pub fn parse(content: &str) -> Self {
        let addresses = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| match line.parse::<Ipv6Addr>() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    tracing::warn!(line, "Skipping malformed address line");
                    None
                }
            })
            .collect();
        Self { addresses }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.addresses.shuffle(rng);
    }

    /// An independent rotation over the current order; each address once.
    pub fn rotation(&self) -> Rotation {
        Rotation {
            remaining: self.addresses.iter().copied().collect(),
        }
    }

    /// Only addresses from the list may be used as a source.
    pub fn contains(&self, addr: &Ipv6Addr) -> bool {
        self.addresses.contains(addr)
    }

    pub fn addresses(&self) -> &[Ipv6Addr] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Per-caller walk through the pool.
#[derive(Debug, Clone)]
pub struct Rotation {
    remaining: VecDeque<Ipv6Addr>,
}

impl Rotation {
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl Iterator for Rotation {
    type Item = Ipv6Addr;

    fn next(&mut self) -> Option<Ipv6Addr> {
        self.remaining.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining.len(), Some(self.remaining.len()))
    }
}

impl ExactSizeIterator for Rotation {}
