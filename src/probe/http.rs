//! HTTP service detection probe.
//!
//! Sends `GET /?page=1&page_size=10` to the target. Any HTTP response
//! counts as a hit. With an expected identity configured, the response
//! body must equal that UUID (case-insensitive) or the host is reported
//! as an auth failure: something answered, but not our service.

use super::{Outcome, Probe, ProbeKind};
use crate::error::{AttemptResult, ConfigError, ConfigResult, ProbeError};
use crate::types::{Port, Target};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// HTTP detect probe.
pub struct HttpDetectProbe {
    client: Client,
    port: Port,
    identity: Option<Uuid>,
}

impl HttpDetectProbe {
    /// Create a probe that accepts any HTTP response.
    pub fn new(port: Port) -> ConfigResult<Self> {
        let client = Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| ConfigError::InvalidValue(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            port,
            identity: None,
        })
    }

    /// Require the response body to equal `identity`.
    pub fn with_identity(mut self, identity: Uuid) -> Self {
        self.identity = Some(identity);
        self
    }

    /// The timeout bounds the whole request, not only the dial.
    async fn attempt(&self, target: &Target, timeout: Duration) -> AttemptResult<()> {
        let url = format!("http://{}/", target.socket_addr(self.port));

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .query(&[("page", "1"), ("page_size", "10")])
            .send()
            .await
            .map_err(classify_request_error)?;

        let Some(expected) = self.identity else {
            return Ok(());
        };

        // The service answered; a body we cannot read leaves its identity unconfirmed.
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::UnreadableBody(e.to_string()))?;
        let actual = body.trim();
        if actual.eq_ignore_ascii_case(&expected.to_string()) {
            Ok(())
        } else {
            Err(ProbeError::IdentityMismatch {
                expected: expected.to_string(),
                actual: actual.chars().take(64).collect(),
            })
        }
    }
}

fn classify_request_error(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::ConnectionFailed(err.to_string())
    }
}

#[async_trait]
impl Probe for HttpDetectProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Http
    }

    async fn probe(&self, target: &Target, timeout: Duration) -> Outcome {
        match self.attempt(target, timeout).await {
            Ok(()) => Outcome::Success,
            Err(e) => {
                debug!(host = %target, error = %e, "http detect failed");
                e.outcome()
            }
        }
    }
}
