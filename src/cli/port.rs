//! Port subcommand implementation.
//!
//! Handles `lanprobe port`: a TCP connect to every port of a range on
//! every host.

use super::RunContext;
use crate::error::CliResult;
use crate::output::{self, PortReport, ReportFilter};
use crate::probe::{SharedProbe, TcpConnectProbe};
use crate::types::{Port, PortRange, Target};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;

/// Check which ports are open across the range.
#[derive(Parser, Debug)]
pub struct PortCommand {
    /// Ports to check, `N` or `N-M`
    #[arg(long, default_value = "22")]
    pub ports: PortRange,

    /// Only list open ports
    #[arg(long)]
    pub open_only: bool,
}

impl PortCommand {
    /// Execute the port command.
    pub(crate) async fn execute(&self, ctx: &RunContext) -> CliResult<()> {
        let space = ctx.space;
        let ports = self.ports;
        let total = space.len() * ports.len();

        if ctx.chatty() {
            output::print_scan_header(
                "port",
                &space.describe(),
                &[
                    ("Ports", ports.to_string()),
                    ("Probes", total.to_string()),
                ],
            );
        }

        // Every port of one host before moving to the next.
        let targets = space.iter().flat_map(move |host| {
            ports
                .iter()
                .map(move |port| Target::with_port(host.addr(), port))
        });

        let probe: SharedProbe = Arc::new(TcpConnectProbe::new(Port::SSH));
        let filter = if self.open_only {
            ReportFilter::default()
        } else {
            ReportFilter::all()
        };

        let started = Instant::now();
        let results = ctx.sweep(ctx.engine, probe, targets, total, filter).await;
        let report = PortReport::from_results(&results, self.open_only);

        if ctx.chatty() {
            output::print_info(&format!(
                "{} open ports on {} hosts",
                report.open_count(),
                report.hosts.iter().filter(|h| h.open_count() > 0).count()
            ));
        }

        output::format_port_report(&report, started.elapsed(), ctx.format)
    }
}
