//! # lanprobe - A Concurrent LAN Sweeper
//!
//! lanprobe probes every address of a contiguous /24 range with a bounded
//! worker pool and sorts the hosts by how they answered: success,
//! authentication failure, or network failure.
//!
//! ## Features
//!
//! - **Pluggable Probes**: SSH login, TCP connect, HTTP service detection, ICMP echo
//! - **Bounded Concurrency**: A fixed worker pool over a bounded task queue
//! - **Cancellation**: Ctrl-C abandons probes in flight and drains without deadlock
//! - **Loop Mode**: Retry one host until it accepts the login
//! - **Multiple Output Formats**: Console, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use lanprobe::engine::{EngineConfig, ProbeEngine};
//! use lanprobe::probe::{SharedProbe, TcpConnectProbe};
//! use lanprobe::types::{AddressSpace, Port};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let probe: SharedProbe = Arc::new(TcpConnectProbe::new(Port::SSH));
//!     let engine = ProbeEngine::new(EngineConfig::default(), probe, CancellationToken::new());
//!
//!     let results = engine.run(&AddressSpace::lan(3, 1, 254)).await.sorted();
//!     for host in &results.ok {
//!         println!("{} is up", host);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`types`] - Addresses, ports and targets
//! - [`probe`] - The `Probe` trait and its SSH, TCP and HTTP implementations
//! - [`engine`] - Worker pool, result collection, sorting and loop mode
//! - [`config`] - Settings management
//! - [`error`] - Error types
//! - [`output`] - Output formatting and live progress
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod probe;
pub mod types;

// Re-export commonly used types
pub use engine::{EngineConfig, LoopRetrier, ProbeEngine, ResultSet, ScanEvent};
pub use error::{CliError, ConfigError, ProbeError};
pub use probe::{Outcome, Probe, ProbeResult};
pub use types::{AddressSpace, Port, PortRange, Target};
