//! Ports and the `N` / `N-M` range syntax of port mode.
//!
//! Port 0 cannot be dialed, so [`Port`] holds a non-zero value and every
//! constructor rejects 0.

use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

/// A dialable TCP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(NonZeroU16);

impl Port {
    /// The SSH port.
    pub const SSH: Port = match NonZeroU16::new(22) {
        Some(n) => Port(n),
        None => unreachable!(),
    };

    /// `None` for 0.
    pub const fn new(port: u16) -> Option<Self> {
        match NonZeroU16::new(port) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    pub const fn as_u16(self) -> u16 {
        self.0.get()
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Settings store ports as plain numbers.
impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(u32::from(value)))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.as_u16()
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value: u32 = s
            .parse()
            .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
        u16::try_from(value)
            .ok()
            .and_then(Port::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

/// Rejected port or port range input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("invalid port range string '{0}', expected N or N-M")]
    InvalidSyntax(String),
}

/// Ports `first..=last`, never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    first: Port,
    last: Port,
}

impl PortRange {
    /// Fails when `first > last`.
    pub fn span(first: Port, last: Port) -> Result<Self, PortError> {
        if first > last {
            return Err(PortError::InvalidRange(first.as_u16(), last.as_u16()));
        }
        Ok(Self { first, last })
    }

    pub fn len(&self) -> usize {
        usize::from(self.last.as_u16() - self.first.as_u16()) + 1
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Port> + Send + 'static {
        (self.first.as_u16()..=self.last.as_u16()).filter_map(Port::new)
    }
}

impl From<Port> for PortRange {
    fn from(port: Port) -> Self {
        Self {
            first: port,
            last: port,
        }
    }
}

/// Prints back the syntax it was parsed from.
impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        if self.last != self.first {
            write!(f, "-{}", self.last)?;
        }
        Ok(())
    }
}

impl FromStr for PortRange {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('-') {
            None => s.parse::<Port>().map(Self::from),
            Some((_, last)) if last.contains('-') => Err(PortError::InvalidSyntax(s.to_string())),
            Some((first, last)) => Self::span(first.parse()?, last.parse()?),
        }
    }
}
