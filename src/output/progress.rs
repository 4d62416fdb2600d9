//! Live scan progress.
//!
//! Drains the engine's [`ScanEvent`] stream on its own task, either
//! driving a progress bar or printing each result as it is decided.

use super::plain::result_line;
use super::report::ReportFilter;
use crate::engine::ScanEvent;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// How progress is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// A progress bar on stderr.
    Bar,
    /// One stderr line per result that passes the filter.
    Lines(ReportFilter),
    /// Nothing; events are drained.
    Hidden,
}

/// Consume `events` until `Finished` or until the sender goes away.
///
/// Returns the number of results seen.
pub fn track(mut events: UnboundedReceiver<ScanEvent>, total: u64, mode: ProgressMode) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let bar = (mode == ProgressMode::Bar).then(|| progress_bar(total));
        let mut seen = 0u64;

        while let Some(event) = events.recv().await {
            let result = match event {
                ScanEvent::Probed(result) => result,
                ScanEvent::Finished => break,
            };
            seen += 1;

            match (&bar, mode) {
                (Some(bar), _) => bar.inc(1),
                (None, ProgressMode::Lines(filter)) if filter.shows(result.outcome) => {
                    eprintln!("{}", result_line(&result));
                }
                _ => {}
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        seen
    })
}

fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar
}
