//! Console output formatting.
//!
//! Produces human-readable output with colors and formatting.

use super::report::{PortReport, ReportFilter};
use crate::engine::ResultSet;
use crate::probe::{Outcome, ProbeResult};
use crate::types::Target;
use chrono::Local;
use console::{style, Style};
use std::io::{self, Write};
use std::time::Duration;

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Print a sweep report to stdout.
pub fn print_report(results: &ResultSet, filter: ReportFilter, elapsed: Duration) -> io::Result<()> {
    let stdout = io::stdout();
    write_report(&mut stdout.lock(), results, filter, elapsed)
}

/// Print a port-scan report to stdout.
pub fn print_port_report(report: &PortReport, elapsed: Duration) -> io::Result<()> {
    let stdout = io::stdout();
    write_port_report(&mut stdout.lock(), report, elapsed)
}

pub(crate) fn write_report<W: Write>(
    out: &mut W,
    results: &ResultSet,
    filter: ReportFilter,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;

    write_section(out, "ok", &results.ok, Style::new().green().bold())?;
    if filter.show_auth {
        write_section(out, "auth error", &results.auth_failed, Style::new().yellow())?;
    }
    if filter.show_network {
        write_section(out, "network error", &results.network_failed, Style::new().red())?;
    }

    writeln!(out, "{}", style(RULE).cyan())?;
    write_elapsed(out, elapsed)
}

fn write_section<W: Write>(
    out: &mut W,
    title: &str,
    targets: &[Target],
    accent: Style,
) -> io::Result<()> {
    writeln!(
        out,
        "  {} ({})",
        accent.apply_to(title),
        style(targets.len()).bold()
    )?;

    if targets.is_empty() {
        writeln!(out, "    {}", style("no host").dim())?;
    }
    for target in targets {
        writeln!(out, "    {}", target)?;
    }
    writeln!(out)
}

pub(crate) fn write_port_report<W: Write>(
    out: &mut W,
    report: &PortReport,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;

    if report.hosts.is_empty() {
        writeln!(out, "  {}", style("no host").dim())?;
    }

    for host in &report.hosts {
        writeln!(
            out,
            "  {} {} open",
            style(host.value).white().bold(),
            style(host.open_count()).green()
        )?;
        for port in &host.ports {
            let state = if port.open {
                style("open").green().bold()
            } else {
                style("closed").red()
            };
            writeln!(out, "    {:>6}  {}", port.value, state)?;
        }
    }

    writeln!(out, "{}", style(RULE).cyan())?;
    write_elapsed(out, elapsed)
}

fn write_elapsed<W: Write>(out: &mut W, elapsed: Duration) -> io::Result<()> {
    writeln!(
        out,
        "  {} {} ms",
        style("Elapsed:").bold(),
        elapsed.as_millis()
    )?;
    writeln!(out)
}

/// Format one decided result as a single line.
pub fn result_line(result: &ProbeResult) -> String {
    let outcome = match result.outcome {
        Outcome::Success => style(result.outcome).green().bold(),
        Outcome::AuthFailure => style(result.outcome).yellow(),
        Outcome::NetworkFailure => style(result.outcome).red(),
        Outcome::Cancelled => style(result.outcome).dim(),
    };
    format!("{:<21} {}", result.target.to_string(), outcome)
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(mode: &str, range: &str, details: &[(&str, String)]) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("lanprobe").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!(
        "{} Started: {}",
        style("•").dim(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    eprintln!("{} Mode: {}", style("•").dim(), style(mode).yellow());
    eprintln!("{} Range: {}", style("•").dim(), style(range).white().bold());
    for (label, value) in details {
        eprintln!("{} {}: {}", style("•").dim(), label, value);
    }
    eprintln!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    eprintln!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}
