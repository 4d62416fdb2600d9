//! SSH subcommand implementation.
//!
//! Handles `lanprobe ssh`: a login attempt on every host of the range, or
//! a single host retried until it accepts the login (`--loop`).

use super::RunContext;
use crate::engine::{LoopRetrier, ResultSet};
use crate::error::{CliResult, ConfigError};
use crate::output::{self, ReportFilter};
use crate::probe::{KeyMaterialProvider, SharedProbe, SshCredentials, SshProbe};
use crate::types::Port;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Try an SSH login on every host of the range.
#[derive(Parser, Debug)]
pub struct SshCommand {
    /// Login user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Login password
    #[arg(short = 'P', long, env = "LANPROBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// SSH port
    #[arg(long)]
    pub port: Option<Port>,

    /// Show hosts that could not be reached
    #[arg(short = 'n', long = "network")]
    pub show_network: bool,

    /// Show hosts that rejected the login
    #[arg(short = 'a', long = "auth")]
    pub show_auth: bool,

    /// Also try public-key authentication
    #[arg(long)]
    pub pubkey: bool,

    /// Private key for --pubkey (defaults to ~/.ssh/id_rsa)
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Retry a single host until the login succeeds
    #[arg(short = 'l', long = "loop")]
    pub loop_mode: bool,

    /// Pause between loop attempts in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval: Option<u64>,
}

impl SshCommand {
    /// Execute the ssh command.
    pub(crate) async fn execute(&self, ctx: &RunContext) -> CliResult<()> {
        let settings = &ctx.settings;
        let credentials = SshCredentials::new(
            self.user.as_deref().unwrap_or(&settings.ssh_user),
            self.password.as_deref().unwrap_or(&settings.ssh_password),
        );
        let port = match self.port {
            Some(port) => port,
            None => Port::try_from(settings.ssh_port)?,
        };

        let mut probe = SshProbe::new(credentials.clone(), port);
        if self.pubkey {
            let path = self
                .key
                .clone()
                .or_else(|| settings.key_path.clone())
                .ok_or_else(|| ConfigError::InvalidValue("no private key path known".to_string()))?;
            // A bad key aborts here, before any host is touched.
            probe = probe.with_key_provider(&KeyMaterialProvider::new(path))?;
        }

        let filter = ReportFilter {
            show_auth: self.show_auth,
            show_network: self.show_network,
        };

        if ctx.chatty() {
            output::print_scan_header(
                if self.loop_mode { "ssh (loop)" } else { "ssh" },
                &ctx.space.describe(),
                &[
                    ("User", credentials.user.clone()),
                    ("Port", port.to_string()),
                    ("Key auth", if probe.uses_key() { "on" } else { "off" }.to_string()),
                ],
            );
        }

        let probe: SharedProbe = Arc::new(probe);
        let started = Instant::now();

        let results = if self.loop_mode {
            self.run_loop(ctx, probe, filter).await?
        } else {
            ctx.sweep(ctx.engine, probe, ctx.space.iter(), ctx.space.len(), filter)
                .await
        };

        output::format_results(&results, filter, started.elapsed(), ctx.format)
    }

    async fn run_loop(
        &self,
        ctx: &RunContext,
        probe: SharedProbe,
        filter: ReportFilter,
    ) -> CliResult<ResultSet> {
        let mut targets = ctx.space.iter();
        let target = match (targets.next(), targets.next()) {
            (Some(target), None) => target,
            _ => {
                return Err(ConfigError::InvalidValue(format!(
                    "loop mode needs exactly one address, got {}",
                    ctx.space.len()
                ))
                .into())
            }
        };

        let mut config = ctx.engine;
        if let Some(ms) = self.interval {
            config = config.with_retry_interval(Duration::from_millis(ms));
        }

        let retrier = LoopRetrier::new(&config, probe, ctx.cancel.clone());
        let accepted = retrier
            .run(target, |result| {
                if filter.shows(result.outcome) {
                    eprintln!("{}", output::result_line(result));
                }
            })
            .await;

        let mut results = ResultSet::default();
        match accepted {
            Some(result) => {
                if ctx.chatty() {
                    output::print_success(&format!("login accepted by {}", result.target));
                }
                results.push(result.outcome, result.target);
            }
            None if ctx.chatty() => output::print_warning("loop interrupted before a login succeeded"),
            None => {}
        }
        Ok(results)
    }
}
