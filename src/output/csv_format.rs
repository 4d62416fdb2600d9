//! CSV output formatting.

use super::report::{PortReport, ReportFilter};
use crate::engine::ResultSet;
use crate::probe::Outcome;
use std::io::{self, Write};

/// Print a sweep report in CSV format.
pub fn print_csv(results: &ResultSet, filter: ReportFilter) -> Result<(), csv::Error> {
    write_csv(io::stdout().lock(), results, filter)
}

/// Print a port-scan report in CSV format.
pub fn print_port_csv(report: &PortReport) -> Result<(), csv::Error> {
    write_port_csv(io::stdout().lock(), report)
}

fn write_csv<W: Write>(out: W, results: &ResultSet, filter: ReportFilter) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["address", "outcome"])?;

    for outcome in [Outcome::Success, Outcome::AuthFailure, Outcome::NetworkFailure] {
        if !filter.shows(outcome) {
            continue;
        }
        for target in results.bucket(outcome) {
            wtr.write_record([target.to_string(), outcome.to_string()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn write_port_csv<W: Write>(out: W, report: &PortReport) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["address", "port", "state"])?;

    for host in &report.hosts {
        for port in &host.ports {
            let state = if port.open { "open" } else { "closed" };
            wtr.write_record([host.value.to_string(), port.value.to_string(), state.to_string()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Port, Target};
    use std::net::Ipv4Addr;

    #[test]
    fn test_rows_follow_filter() {
        let results = ResultSet {
            ok: vec![Target::host(Ipv4Addr::new(192, 168, 3, 1))],
            auth_failed: vec![Target::host(Ipv4Addr::new(192, 168, 3, 2))],
            network_failed: vec![Target::host(Ipv4Addr::new(192, 168, 3, 3))],
        };
        let filter = ReportFilter {
            show_auth: false,
            show_network: true,
        };

        let mut buf = Vec::new();
        write_csv(&mut buf, &results, filter).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "address,outcome\n192.168.3.1,ok\n192.168.3.3,network error\n"
        );
    }

    #[test]
    fn test_port_rows() {
        let results = ResultSet {
            ok: vec![Target::with_port(Ipv4Addr::new(10, 0, 0, 9), Port::SSH)],
            ..ResultSet::default()
        };
        let report = PortReport::from_results(&results, false);

        let mut buf = Vec::new();
        write_port_csv(&mut buf, &report).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "address,port,state\n10.0.0.9,22,open\n"
        );
    }
}
