//! Probe targets.
//!
//! A [`Target`] is one host address, optionally paired with a port. It is
//! produced by [`AddressSpace`](super::AddressSpace) and never changes
//! afterwards; two targets are the same target when they print the same.

use super::Port;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// A single probe target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    addr: Ipv4Addr,
    port: Option<Port>,
}

impl Target {
    /// Create a target without a port.
    pub const fn host(addr: Ipv4Addr) -> Self {
        Self { addr, port: None }
    }

    /// Create a target with a port.
    pub const fn with_port(addr: Ipv4Addr, port: Port) -> Self {
        Self {
            addr,
            port: Some(port),
        }
    }

    /// The host address.
    pub const fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// The port, if the target carries one.
    pub const fn port(&self) -> Option<Port> {
        self.port
    }

    /// Numeric value of the final dotted component.
    pub fn last_octet(&self) -> u8 {
        self.addr.octets()[3]
    }

    /// Socket address for dialing, falling back to `default_port`.
    pub fn socket_addr(&self, default_port: Port) -> SocketAddr {
        let port = self.port.unwrap_or(default_port);
        SocketAddr::V4(SocketAddrV4::new(self.addr, port.as_u16()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.addr, port),
            None => write!(f, "{}", self.addr),
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let addr = Ipv4Addr::new(192, 168, 3, 7);
        assert_eq!(Target::host(addr).to_string(), "192.168.3.7");
        assert_eq!(
            Target::with_port(addr, Port::SSH).to_string(),
            "192.168.3.7:22"
        );
    }

    #[test]
    fn test_accessors() {
        let target = Target::with_port(Ipv4Addr::new(10, 0, 0, 12), Port::SSH);
        assert_eq!(target.last_octet(), 12);
        assert_eq!(target.port(), Some(Port::SSH));
        assert_eq!(Target::host(Ipv4Addr::new(10, 0, 0, 3)).port(), None);
    }

    #[test]
    fn test_socket_addr_falls_back_to_default_port() {
        let target = Target::host(Ipv4Addr::LOCALHOST);
        assert_eq!(target.socket_addr(Port::SSH).port(), 22);
    }

    #[test]
    fn test_serializes_as_string() {
        let target = Target::with_port(Ipv4Addr::new(192, 168, 6, 61), Port::SSH);
        assert_eq!(
            serde_json::to_string(&target).unwrap(),
            "\"192.168.6.61:22\""
        );
    }
}
