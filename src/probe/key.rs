//! Private key material for SSH public-key authentication.
//!
//! The key is read and parsed at most once per provider. The first
//! successful load is memoized and every later call returns the same key
//! without touching the filesystem again. A failed load is a configuration
//! error for the whole run, not a per-target failure.

use crate::error::{ConfigError, ConfigResult};
use directories::BaseDirs;
use russh_keys::key::KeyPair;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;

/// Function that turns a key file into usable key material.
pub type KeyLoader<K> = fn(&Path) -> ConfigResult<K>;

/// Memoizing source of key material.
pub struct KeyMaterialProvider<K = KeyPair> {
    path: PathBuf,
    loader: KeyLoader<K>,
    cached: OnceLock<Arc<K>>,
    init: Mutex<()>,
}

impl KeyMaterialProvider<KeyPair> {
    /// Provider for an OpenSSH/PEM private key at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_loader(path, load_private_key)
    }
}

impl<K> KeyMaterialProvider<K> {
    /// Provider with a custom loader.
    pub fn with_loader(path: impl Into<PathBuf>, loader: KeyLoader<K>) -> Self {
        Self {
            path: path.into(),
            loader,
            cached: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Path the key is read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the key has already been loaded.
    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Return the key, reading it on first use.
    pub fn load(&self) -> ConfigResult<Arc<K>> {
        if let Some(key) = self.cached.get() {
            return Ok(Arc::clone(key));
        }

        // Serializes first loads so the file is read once even under contention.
        let _guard = self.init.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(key) = self.cached.get() {
            return Ok(Arc::clone(key));
        }

        debug!(path = %self.path.display(), "loading key material");
        let key = Arc::new((self.loader)(&self.path)?);
        let _ = self.cached.set(Arc::clone(&key));
        Ok(key)
    }
}

/// `~/.ssh/id_rsa`, if a home directory is known.
pub fn default_key_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".ssh").join("id_rsa"))
}

fn load_private_key(path: &Path) -> ConfigResult<KeyPair> {
    russh_keys::load_secret_key(path, None).map_err(|e| ConfigError::KeyMaterial {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
