//! Ping subcommand implementation.
//!
//! Handles `lanprobe ping`: an ICMP liveness sweep of the range.

use super::RunContext;
use crate::error::CliResult;
use crate::output::{self, ReportFilter};
use crate::probe::{PingProbe, SharedProbe};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;

/// Find the hosts that answer ICMP echo.
#[derive(Parser, Debug)]
pub struct PingCommand {
    /// Show hosts that did not answer
    #[arg(short = 'n', long = "network")]
    pub show_network: bool,
}

impl PingCommand {
    /// Execute the ping command.
    pub(crate) async fn execute(&self, ctx: &RunContext) -> CliResult<()> {
        if ctx.chatty() {
            output::print_scan_header("ping", &ctx.space.describe(), &[]);
        }

        let filter = ReportFilter {
            show_auth: false,
            show_network: self.show_network,
        };
        let probe: SharedProbe = Arc::new(PingProbe::new());

        let started = Instant::now();
        let results = ctx
            .sweep(ctx.engine, probe, ctx.space.iter(), ctx.space.len(), filter)
            .await;

        if ctx.chatty() && results.ok.is_empty() && !results.network_failed.is_empty() {
            output::print_warning("no host answered; ICMP may need extra privileges");
        }

        output::format_results(&results, filter, started.elapsed(), ctx.format)
    }
}
