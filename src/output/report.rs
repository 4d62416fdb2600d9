//! Report shaping shared by every output format.

use crate::engine::{sort_by_last_octet, ResultSet};
use crate::probe::Outcome;
use crate::types::{Port, Target};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Which failure buckets a report shows. Successes are always shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub show_auth: bool,
    pub show_network: bool,
}

impl ReportFilter {
    /// Show every bucket.
    pub fn all() -> Self {
        Self {
            show_auth: true,
            show_network: true,
        }
    }

    /// Whether a result with `outcome` belongs in the report.
    pub fn shows(&self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Success => true,
            Outcome::AuthFailure => self.show_auth,
            Outcome::NetworkFailure => self.show_network,
            Outcome::Cancelled => false,
        }
    }
}

/// One probed port of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortState {
    pub value: u16,
    pub open: bool,
}

/// Every probed port of one host, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostPorts {
    pub value: Ipv4Addr,
    pub ports: Vec<PortState>,
}

impl HostPorts {
    /// Number of open ports.
    pub fn open_count(&self) -> usize {
        self.ports.iter().filter(|p| p.open).count()
    }
}

/// Port-scan results grouped per host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortReport {
    pub hosts: Vec<HostPorts>,
}

impl PortReport {
    /// Group a port scan's results by host.
    ///
    /// Open means [`Outcome::Success`]; anything else decided counts as
    /// closed. With `open_only`, closed ports and hosts left without open
    /// ports are dropped. Hosts are ordered by last octet.
    pub fn from_results(results: &ResultSet, open_only: bool) -> Self {
        let mut grouped: BTreeMap<Ipv4Addr, Vec<PortState>> = BTreeMap::new();

        let classified = results
            .ok
            .iter()
            .map(|t| (t, true))
            .chain(results.auth_failed.iter().map(|t| (t, false)))
            .chain(results.network_failed.iter().map(|t| (t, false)));

        for (target, open) in classified {
            if open_only && !open {
                continue;
            }
            let Some(port) = target.port().map(Port::as_u16) else {
                continue;
            };
            grouped
                .entry(target.addr())
                .or_default()
                .push(PortState { value: port, open });
        }

        let mut addrs: Vec<Target> = grouped.keys().copied().map(Target::host).collect();
        sort_by_last_octet(&mut addrs);

        let hosts = addrs
            .into_iter()
            .filter_map(|host| {
                let mut ports = grouped.remove(&host.addr())?;
                ports.sort_by_key(|p| p.value);
                Some(HostPorts {
                    value: host.addr(),
                    ports,
                })
            })
            .collect();

        Self { hosts }
    }

    /// Total open ports across hosts.
    pub fn open_count(&self) -> usize {
        self.hosts.iter().map(HostPorts::open_count).sum()
    }
}
