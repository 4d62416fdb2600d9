//! Detect subcommand implementation.
//!
//! Handles `lanprobe detect`: an HTTP request to every host, optionally
//! checking that the answer carries the expected service UUID.

use super::RunContext;
use crate::error::CliResult;
use crate::output::{self, ReportFilter};
use crate::probe::{HttpDetectProbe, SharedProbe};
use crate::types::Port;
use clap::Parser;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Look for an HTTP service across the range.
#[derive(Parser, Debug)]
pub struct DetectCommand {
    /// Port the service listens on
    #[arg(long)]
    pub port: Option<Port>,

    /// Require the response body to equal --uuid
    #[arg(long)]
    pub enable_uuid: bool,

    /// Expected service UUID [default: the `detect_uuid` setting]
    #[arg(long, value_name = "UUID")]
    pub uuid: Option<Uuid>,

    /// Show hosts that answered with a different identity
    #[arg(short = 'a', long = "auth")]
    pub show_auth: bool,

    /// Show hosts that could not be reached
    #[arg(short = 'n', long = "network")]
    pub show_network: bool,
}

impl DetectCommand {
    /// The UUID to verify, if verification is on.
    fn identity(&self, configured: Uuid) -> Option<Uuid> {
        self.enable_uuid.then(|| self.uuid.unwrap_or(configured))
    }

    /// Execute the detect command.
    pub(crate) async fn execute(&self, ctx: &RunContext) -> CliResult<()> {
        let port = match self.port {
            Some(port) => port,
            None => Port::try_from(ctx.settings.detect_port)?,
        };
        let identity = self.identity(ctx.settings.detect_uuid);

        let mut probe = HttpDetectProbe::new(port)?;
        if let Some(uuid) = identity {
            probe = probe.with_identity(uuid);
        }

        // Detect has its own, longer default timeout.
        let timeout = ctx
            .timeout_override
            .unwrap_or(Duration::from_millis(ctx.settings.http_timeout_ms));
        let config = ctx.engine.with_probe_timeout(timeout);

        if ctx.chatty() {
            output::print_scan_header(
                "detect",
                &ctx.space.describe(),
                &[
                    ("Port", port.to_string()),
                    (
                        "UUID",
                        identity.map_or_else(|| "not checked".to_string(), |u| u.to_string()),
                    ),
                ],
            );
        }

        let filter = ReportFilter {
            show_auth: self.show_auth,
            show_network: self.show_network,
        };
        let probe: SharedProbe = Arc::new(probe);

        let started = Instant::now();
        let results = ctx
            .sweep(config, probe, ctx.space.iter(), ctx.space.len(), filter)
            .await;

        output::format_results(&results, filter, started.elapsed(), ctx.format)
    }
}
