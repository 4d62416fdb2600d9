//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG config directory. A
//! missing file means defaults; an explicitly requested file must exist.

use crate::engine::{EngineConfig, DEFAULT_CONCURRENCY};
use crate::error::{ConfigError, ConfigResult};
use crate::probe::key::default_key_path;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Identity the detect service answers with unless configured otherwise.
pub const DEFAULT_SERVICE_UUID: Uuid = Uuid::from_u128(0x481fe328_4a38_4eac_8189_0cee06846d4a);

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/lanprobe)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve the XDG directories.
    pub fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "lanprobe", "lanprobe")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Worker bound for a scan.
    pub concurrency: usize,
    /// Per-probe dial timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// Pause between loop-mode attempts in milliseconds.
    pub retry_interval_ms: u64,
    /// Leading two octets of scanned networks.
    pub network_base: String,
    /// SSH port.
    pub ssh_port: u16,
    /// SSH login user.
    pub ssh_user: String,
    /// SSH login password.
    pub ssh_password: String,
    /// Private key for public-key authentication.
    pub key_path: Option<PathBuf>,
    /// Port of the service looked for by detect mode.
    pub detect_port: u16,
    /// UUID that `detect --enable-uuid` checks for.
    pub detect_uuid: Uuid,
    /// Request timeout for detect mode in milliseconds.
    pub http_timeout_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout_ms: 500,
            retry_interval_ms: 1000,
            network_base: "192.168".to_string(),
            ssh_port: 22,
            ssh_user: "root".to_string(),
            ssh_password: "123456".to_string(),
            key_path: default_key_path(),
            detect_port: 8080,
            detect_uuid: DEFAULT_SERVICE_UUID,
            http_timeout_ms: 1000,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if absent.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::new()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Engine configuration derived from these settings.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_concurrency(self.concurrency)
            .with_probe_timeout(Duration::from_millis(self.probe_timeout_ms))
            .with_retry_interval(Duration::from_millis(self.retry_interval_ms))
    }
}
