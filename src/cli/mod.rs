//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `lanprobe ssh` - Try an SSH login on every host of a range
//! - `lanprobe port` - Check which ports are open across a range
//! - `lanprobe detect` - Look for an HTTP service across a range
//! - `lanprobe ping` - Find the hosts that answer ICMP echo

mod detect;
mod ping;
mod port;
mod ssh;

pub use detect::DetectCommand;
pub use ping::PingCommand;
pub use port::PortCommand;
pub use ssh::SshCommand;

use crate::config::AppSettings;
use crate::engine::{EngineConfig, ProbeEngine, ResultSet};
use crate::error::CliResult;
use crate::output::{self, ProgressMode, ReportFilter};
use crate::probe::SharedProbe;
use crate::types::{AddressSpace, Target};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// lanprobe - A concurrent LAN sweeper.
///
/// Probes every address of a /24 with an SSH login, a TCP connect, an
/// HTTP request or an ICMP echo, and sorts the hosts by how they answered.
#[derive(Parser, Debug)]
#[command(name = "lanprobe")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent LAN sweeper", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Third octet of the scanned network
    #[arg(short, long, global = true, default_value = "3")]
    pub prefix: u32,

    /// First host suffix
    #[arg(short, long, global = true, default_value = "1")]
    pub start: u32,

    /// Last host suffix
    #[arg(short, long, global = true, default_value = "254")]
    pub end: u32,

    /// Output format for results
    #[arg(long, global = true, value_enum, default_value = "console")]
    pub output_format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Maximum number of concurrent probes (0 = default)
    #[arg(short, long, global = true)]
    pub concurrency: Option<usize>,

    /// Probe timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Try an SSH login on every host
    Ssh(SshCommand),

    /// Check which ports are open
    Port(PortCommand),

    /// Look for an HTTP service
    Detect(DetectCommand),

    /// Find the hosts that answer ICMP echo
    Ping(PingCommand),
}

impl Cli {
    /// Resolve settings and run the selected subcommand.
    pub async fn execute(&self, cancel: CancellationToken) -> CliResult<()> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };

        let space =
            AddressSpace::from_parts(&settings.network_base, self.prefix, self.start, self.end)?;

        let mut engine = settings.engine_config();
        if let Some(concurrency) = self.concurrency {
            engine = engine.with_concurrency(concurrency);
        }
        let timeout_override = self.timeout.map(Duration::from_millis);
        if let Some(timeout) = timeout_override {
            engine = engine.with_probe_timeout(timeout);
        }

        let ctx = RunContext {
            settings,
            space,
            engine,
            timeout_override,
            format: self.output_format,
            verbose: self.verbose,
            cancel,
        };

        match &self.command {
            Commands::Ssh(cmd) => cmd.execute(&ctx).await,
            Commands::Port(cmd) => cmd.execute(&ctx).await,
            Commands::Detect(cmd) => cmd.execute(&ctx).await,
            Commands::Ping(cmd) => cmd.execute(&ctx).await,
        }
    }
}

/// Everything a subcommand needs besides its own flags.
pub(crate) struct RunContext {
    pub settings: AppSettings,
    pub space: AddressSpace,
    pub engine: EngineConfig,
    /// `--timeout`, when given.
    pub timeout_override: Option<Duration>,
    pub format: OutputFormat,
    pub verbose: bool,
    pub cancel: CancellationToken,
}

impl RunContext {
    fn progress_mode(&self, filter: ReportFilter) -> ProgressMode {
        if self.verbose {
            ProgressMode::Lines(filter)
        } else if self.format == OutputFormat::Console {
            ProgressMode::Bar
        } else {
            ProgressMode::Hidden
        }
    }

    /// Whether headers and notices go out. Machine-readable runs stay quiet.
    fn chatty(&self) -> bool {
        self.format == OutputFormat::Console
    }

    /// Run `probe` over `targets` with live progress. Returns sorted buckets.
    async fn sweep<I>(
        &self,
        config: EngineConfig,
        probe: SharedProbe,
        targets: I,
        total: usize,
        filter: ReportFilter,
    ) -> ResultSet
    where
        I: IntoIterator<Item = Target>,
        I::IntoIter: Send + 'static,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let progress = output::track(events_rx, total as u64, self.progress_mode(filter));

        let engine = ProbeEngine::new(config, probe, self.cancel.clone()).with_events(events_tx);
        let results = engine.run_targets(targets).await.sorted();
        drop(engine);

        match progress.await {
            Ok(seen) => debug!(seen, "progress drained"),
            Err(e) => debug!(error = %e, "progress task failed"),
        }

        if self.cancel.is_cancelled() && self.chatty() {
            output::print_warning("scan interrupted, results are partial");
        }
        results
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console report
    #[default]
    Console,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_defaults() {
        let cli = Cli::try_parse_from(["lanprobe", "ssh"]).unwrap();
        assert_eq!(cli.prefix, 3);
        assert_eq!(cli.start, 1);
        assert_eq!(cli.end, 254);
        assert_eq!(cli.output_format, OutputFormat::Console);
        assert!(cli.concurrency.is_none());
        assert!(matches!(cli.command, Commands::Ssh(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lanprobe",
            "port",
            "-p",
            "10",
            "-s",
            "100",
            "-e",
            "110",
            "--output-format",
            "json",
            "-c",
            "16",
            "--timeout",
            "250",
        ])
        .unwrap();

        assert_eq!((cli.prefix, cli.start, cli.end), (10, 100, 110));
        assert_eq!(cli.output_format, OutputFormat::Json);
        assert_eq!(cli.concurrency, Some(16));
        assert_eq!(cli.timeout, Some(250));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["lanprobe", "--output-format", "xml", "ssh"]).is_err());
    }

    #[tokio::test]
    async fn test_bad_range_fails_before_scanning() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        std::fs::write(&config, "{}").unwrap();

        let cli = Cli::try_parse_from([
            "lanprobe",
            "--config",
            config.to_str().unwrap(),
            "-e",
            "300",
            "port",
        ])
        .unwrap();

        let err = cli.execute(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, crate::error::CliError::Address(_)));
    }

    #[tokio::test]
    async fn test_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.json");

        let cli = Cli::try_parse_from(["lanprobe", "--config", absent.to_str().unwrap(), "ssh"])
            .unwrap();

        let err = cli.execute(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, crate::error::CliError::Config(_)));
    }
}
