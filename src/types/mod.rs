//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod address;
mod port;
mod target;

pub use address::{AddressError, AddressSpace, DEFAULT_NETWORK_BASE};
pub use port::{Port, PortError, PortRange};
pub use target::Target;
