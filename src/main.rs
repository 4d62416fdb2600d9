use anyhow::Result;
use clap::Parser;
use lanprobe::cli::Cli;
use lanprobe::output;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose. Logs go to stderr so stdout stays parseable.
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling scan");
            on_interrupt.cancel();
        }
    });

    if let Err(e) = cli.execute(cancel).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
