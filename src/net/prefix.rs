//! /64 prefix derivation and sibling generation.
//!
//! Siblings are written `<prefix>::<n>` with `n` in decimal, so suffix 200
//! becomes the group `0x200`. This is the convention the consuming
//! application and the container image have always used, so the list stays
//! stable across image versions.

use std::fmt;
use std::net::Ipv6Addr;

/// Largest suffix whose decimal digits still fit in one IPv6 group.
pub const MAX_SUFFIX: u16 = 9999;

/// The first four 16-bit groups of an IPv6 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix64 {
    segments: [u16; 4],
}

impl Prefix64 {
    pub fn from_addr(addr: Ipv6Addr) -> Self {
        let s = addr.segments();
        Self {
            segments: [s[0], s[1], s[2], s[3]],
        }
    }

    /// `<prefix>::<suffix>`, or `None` when the suffix has more than four digits.
    pub fn sibling(&self, suffix: u16) -> Option<Ipv6Addr> {
        let group = u16::from_str_radix(&suffix.to_string(), 16).ok()?;
        let [a, b, c, d] = self.segments;
        Some(Ipv6Addr::new(a, b, c, d, 0, 0, 0, group))
    }
}

impl fmt::Display for Prefix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.segments;
        write!(f, "{:x}:{:x}:{:x}:{:x}", a, b, c, d)
    }
}

/// Generate the siblings of a base address for suffixes `first..first + count`.
///
/// A sibling equal to `base` is still produced; assigning it reports the
/// address as already present.
pub fn generate_siblings(base: Ipv6Addr, first: u16, count: u16) -> Vec<Ipv6Addr> {
    let prefix = Prefix64::from_addr(base);
    let last = first.saturating_add(count);

    (first..last)
        .filter_map(|suffix| prefix.sibling(suffix))
        .collect()
}
