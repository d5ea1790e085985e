//! Terminal progress for commit runs.

use indicatif::{ProgressBar, ProgressStyle};
use movr_library::{CommitEvent, CommitOutcome, Progress};
use std::time::Duration;

const TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {wide_msg}";
const TICK: Duration = Duration::from_millis(100);

/// Remaining time the way the operator reads it: seconds, then minutes, then
/// hours.
pub fn format_remaining(remaining: Duration) -> String {
    let seconds = remaining.as_secs_f64();
    if seconds < 60.0 {
        format!("{seconds:.0} sec")
    } else if seconds < 3600.0 {
        format!("{:.1} min", seconds / 60.0)
    } else {
        format!("{:.1} hr", seconds / 3600.0)
    }
}

fn message(progress: &Progress) -> String {
    match (progress.throughput, progress.eta) {
        (Some(throughput), Some(eta)) => format!("{throughput:.1} files/sec, {} remaining", format_remaining(eta)),
        _ => String::new(),
    }
}

/// Draws a [`ProgressBar`] from [`CommitEvent`]s.
pub struct CommitProgress {
    bar: ProgressBar,
}
impl CommitProgress {
    /// Draws to stderr; indicatif hides the bar when that is not a terminal.
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }

    pub fn update(&self, event: &CommitEvent) {
        match event {
            CommitEvent::Started { total } => {
                self.bar.set_length(*total as u64);
                self.bar.enable_steady_tick(TICK);
            },
            CommitEvent::Progress { outcome, progress, .. } => {
                if let CommitOutcome::Failed(reason) = outcome {
                    self.bar.println(format!("error: {reason}"));
                }
                self.bar.set_position(progress.completed as u64);
                self.bar.set_message(message(progress));
            },
            CommitEvent::Complete(summary) => self.bar.finish_with_message(summary.to_string()),
        }
    }
}
