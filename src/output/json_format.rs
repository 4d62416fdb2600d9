//! JSON output formatting.

use super::report::{PortReport, ReportFilter};
use crate::engine::ResultSet;
use crate::types::Target;
use serde::Serialize;
use std::io::{self, Write};

/// Sweep report with hidden buckets left out entirely.
#[derive(Serialize)]
struct SweepJson<'a> {
    ok_list: &'a [Target],
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_err_list: Option<&'a [Target]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network_err_list: Option<&'a [Target]>,
}

impl<'a> SweepJson<'a> {
    fn new(results: &'a ResultSet, filter: ReportFilter) -> Self {
        Self {
            ok_list: &results.ok,
            auth_err_list: filter.show_auth.then_some(results.auth_failed.as_slice()),
            network_err_list: filter
                .show_network
                .then_some(results.network_failed.as_slice()),
        }
    }
}

/// Print a sweep report in JSON format.
pub fn print_json(results: &ResultSet, filter: ReportFilter) -> io::Result<()> {
    let stdout = io::stdout();
    write_json(&mut stdout.lock(), &SweepJson::new(results, filter))
}

/// Print a port-scan report in JSON format.
pub fn print_port_json(report: &PortReport) -> io::Result<()> {
    let stdout = io::stdout();
    write_json(&mut stdout.lock(), report)
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(out, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn results() -> ResultSet {
        ResultSet {
            ok: vec![Target::host(Ipv4Addr::new(192, 168, 3, 2))],
            auth_failed: vec![Target::host(Ipv4Addr::new(192, 168, 3, 4))],
            network_failed: vec![],
        }
    }

    fn render(filter: ReportFilter) -> serde_json::Value {
        let results = results();
        let mut buf = Vec::new();
        write_json(&mut buf, &SweepJson::new(&results, filter)).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn test_hidden_lists_are_omitted() {
        let json = render(ReportFilter::default());

        assert_eq!(json["ok_list"], serde_json::json!(["192.168.3.2"]));
        assert!(json.get("auth_err_list").is_none());
        assert!(json.get("network_err_list").is_none());
    }

    #[test]
    fn test_shown_empty_list_is_present() {
        let json = render(ReportFilter::all());

        assert_eq!(json["auth_err_list"], serde_json::json!(["192.168.3.4"]));
        assert_eq!(json["network_err_list"], serde_json::json!([]));
    }
}
