//! Contiguous host ranges on a /24.
//!
//! An [`AddressSpace`] maps `(network, start, end)` to the ordered targets
//! `network.start ..= network.end`. Iteration is lazy and restartable, and
//! `start > end` simply yields nothing.

use super::Target;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

/// Default leading octets for LAN ranges.
pub const DEFAULT_NETWORK_BASE: [u8; 2] = [192, 168];

/// Error type for address range construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("host suffix {0} is out of range (0-255)")]
    SuffixOutOfRange(u32),
    #[error("network prefix {0} is out of range (0-255)")]
    PrefixOutOfRange(u32),
    #[error("invalid network base '{0}', expected two octets like 192.168")]
    InvalidBase(String),
}

/// A range of host addresses sharing their first three octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSpace {
    network: [u8; 3],
    start: u8,
    end: u8,
}

impl AddressSpace {
    /// Build a range from the first three octets of `network`.
    pub fn new(network: Ipv4Addr, start: u8, end: u8) -> Self {
        let [a, b, c, _] = network.octets();
        Self {
            network: [a, b, c],
            start,
            end,
        }
    }

    /// Build `192.168.<prefix>.<start..=end>`.
    pub fn lan(prefix: u8, start: u8, end: u8) -> Self {
        let [a, b] = DEFAULT_NETWORK_BASE;
        Self::new(Ipv4Addr::new(a, b, prefix, 0), start, end)
    }

    /// Build a range from unchecked command-line numbers.
    ///
    /// `base` holds the two leading octets ("192.168"). Values outside a
    /// byte are rejected; `start > end` is accepted and yields nothing.
    pub fn from_parts(base: &str, prefix: u32, start: u32, end: u32) -> Result<Self, AddressError> {
        let [a, b] = parse_base(base)?;
        let prefix = u8::try_from(prefix).map_err(|_| AddressError::PrefixOutOfRange(prefix))?;
        let start = u8::try_from(start).map_err(|_| AddressError::SuffixOutOfRange(start))?;
        let end = u8::try_from(end).map_err(|_| AddressError::SuffixOutOfRange(end))?;
        Ok(Self::new(Ipv4Addr::new(a, b, prefix, 0), start, end))
    }

    /// Number of targets in the range.
    pub fn len(&self) -> usize {
        self.suffixes().count()
    }

    /// True when `start > end`.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// The target for one host suffix.
    pub fn target(&self, suffix: u8) -> Target {
        let [a, b, c] = self.network;
        Target::host(Ipv4Addr::new(a, b, c, suffix))
    }

    /// Iterate the targets in suffix order.
    pub fn iter(&self) -> impl Iterator<Item = Target> + Send + 'static {
        let space = *self;
        self.suffixes().map(move |suffix| space.target(suffix))
    }

    /// Human-readable `first to last` description.
    pub fn describe(&self) -> String {
        let [a, b, c] = self.network;
        format!(
            "{a}.{b}.{c}.{} to {a}.{b}.{c}.{}",
            self.start, self.end
        )
    }

    fn suffixes(&self) -> RangeInclusive<u8> {
        self.start..=self.end
    }
}

impl IntoIterator for &AddressSpace {
    type Item = Target;
    type IntoIter = Box<dyn Iterator<Item = Target> + Send>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

fn parse_base(base: &str) -> Result<[u8; 2], AddressError> {
    let invalid = || AddressError::InvalidBase(base.to_string());
    let parts: Vec<&str> = base.trim().split('.').collect();
    match parts.as_slice() {
        [a, b] => Ok([
            a.parse().map_err(|_| invalid())?,
            b.parse().map_err(|_| invalid())?,
        ]),
        _ => Err(invalid()),
    }
}
