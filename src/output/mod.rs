//! Output formatting module.
//!
//! Provides formatters for console, JSON, and CSV output of scan results,
//! plus live progress while a scan runs.

mod csv_format;
mod json_format;
mod plain;
mod progress;
mod report;

pub use csv_format::{print_csv, print_port_csv};
pub use json_format::{print_json, print_port_json};
pub use plain::{
    print_error, print_info, print_port_report, print_report, print_scan_header, print_success,
    print_warning, result_line,
};
pub use progress::{track, ProgressMode};
pub use report::{HostPorts, PortReport, PortState, ReportFilter};

use crate::cli::OutputFormat;
use crate::engine::ResultSet;
use crate::error::CliResult;
use std::time::Duration;

/// Format and print a sweep report according to the specified format.
pub fn format_results(
    results: &ResultSet,
    filter: ReportFilter,
    elapsed: Duration,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Console => plain::print_report(results, filter, elapsed)?,
        OutputFormat::Json => json_format::print_json(results, filter)?,
        OutputFormat::Csv => csv_format::print_csv(results, filter)?,
    }
    Ok(())
}

/// Format and print a port-scan report according to the specified format.
pub fn format_port_report(
    report: &PortReport,
    elapsed: Duration,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Console => plain::print_port_report(report, elapsed)?,
        OutputFormat::Json => json_format::print_port_json(report)?,
        OutputFormat::Csv => csv_format::print_port_csv(report)?,
    }
    Ok(())
}
