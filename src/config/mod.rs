//! Configuration management.
//!
//! Handles application settings stored under XDG-compliant directories.

mod settings;

pub use settings::{AppSettings, Paths, DEFAULT_SERVICE_UUID};
