//! SSH login probe.
//!
//! Dials the target, runs the SSH handshake and tries password
//! authentication, then optionally public-key authentication.
//!
//! Host keys are never verified: every server key is accepted. The tool
//! sweeps hosts it has never seen, so there is nothing to pin against.
//!
//! Only the TCP dial is bounded by the probe timeout. Handshake and
//! authentication run unbounded on the connected stream.

use super::tcp::connect_with_timeout;
use super::{KeyMaterialProvider, Outcome, Probe, ProbeKind};
use crate::error::{AttemptResult, ConfigResult, ProbeError};
use crate::types::{Port, Target};
use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::Disconnect;
use russh_keys::key::{KeyPair, PublicKey};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Login credentials.
#[derive(Clone)]
pub struct SshCredentials {
    pub user: String,
    pub password: String,
}

impl SshCredentials {
    /// Create credentials for `user` with `password`.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SshCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client handler that trusts any host key.
struct AcceptAnyHostKey;

#[async_trait]
impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// SSH login probe.
pub struct SshProbe {
    credentials: SshCredentials,
    port: Port,
    config: Arc<client::Config>,
    key: Option<Arc<KeyPair>>,
}

impl SshProbe {
    /// Create a password-only SSH probe.
    ///
    /// # Arguments
    /// * `credentials` - User and password to try
    /// * `port` - Port dialed for targets that carry none
    pub fn new(credentials: SshCredentials, port: Port) -> Self {
        Self {
            credentials,
            port,
            config: Arc::new(client::Config::default()),
            key: None,
        }
    }

    /// Also try public-key authentication with the provider's key.
    ///
    /// The key is loaded here, so unreadable key material fails the whole
    /// run before any host is probed.
    pub fn with_key_provider(mut self, provider: &KeyMaterialProvider) -> ConfigResult<Self> {
        self.key = Some(provider.load()?);
        Ok(self)
    }

    /// Whether public-key authentication is enabled.
    pub fn uses_key(&self) -> bool {
        self.key.is_some()
    }

    async fn attempt(&self, target: &Target, timeout: Duration) -> AttemptResult<()> {
        let stream = connect_with_timeout(target.socket_addr(self.port), timeout).await?;

        let mut session = client::connect_stream(Arc::clone(&self.config), stream, AcceptAnyHostKey)
            .await
            .map_err(|e| ProbeError::Handshake(e.to_string()))?;

        let result = self.authenticate(&mut session).await;
        // Best effort; dropping the handle closes the session regardless.
        let _ = session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await;
        result
    }

    async fn authenticate(&self, session: &mut Handle<AcceptAnyHostKey>) -> AttemptResult<()> {
        let user = &self.credentials.user;

        if session
            .authenticate_password(user, &self.credentials.password)
            .await
            .map_err(|e| ProbeError::Handshake(e.to_string()))?
        {
            return Ok(());
        }

        if let Some(key) = &self.key {
            if session
                .authenticate_publickey(user, Arc::clone(key))
                .await
                .map_err(|e| ProbeError::Handshake(e.to_string()))?
            {
                return Ok(());
            }
        }

        Err(ProbeError::AuthRejected)
    }
}

#[async_trait]
impl Probe for SshProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Ssh
    }

    async fn probe(&self, target: &Target, timeout: Duration) -> Outcome {
        match self.attempt(target, timeout).await {
            Ok(()) => Outcome::Success,
            Err(e) => {
                debug!(host = %target, error = %e, "ssh login failed");
                e.outcome()
            }
        }
    }
}
