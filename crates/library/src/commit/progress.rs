use crate::record::CommitOutcome;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::{Duration, Instant};

/// Throughput and ETA are only estimated once this much time has passed;
/// before that a handful of fast copies would give wild numbers.
const ESTIMATE_AFTER: Duration = Duration::from_secs(1);

/// Where a commit run is, after one more record has been dealt with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Records dealt with so far, including the one just finished.
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
    /// Records per second.
    pub throughput: Option<f64>,
    /// Estimated time until the remaining records are done.
    pub eta: Option<Duration>,
}
impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 { 1.0 } else { self.completed as f64 / self.total as f64 }
    }
}

/// Tally of a finished commit run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub total: usize,
    /// Committed under either the canonical or a disambiguated name.
    pub succeeded: usize,
    /// Of `succeeded`, how many had to be renamed.
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
    /// Average records per second over the whole run.
    pub throughput: f64,
}
impl Summary {
    /// Records that were not committed: failures plus skips.
    pub fn errors(&self) -> usize {
        self.failed + self.skipped
    }
}
impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.errors() == 0 {
            write!(f, "all {} files processed successfully", self.succeeded)?;
        } else {
            write!(f, "completed: {} successful, {} errors", self.succeeded, self.errors())?;
        }
        write!(f, " in {:.1}s (avg: {:.1} files/sec)", self.elapsed.as_secs_f64(), self.throughput)
    }
}

/// Counts outcomes as they arrive and derives [`Progress`] and the final
/// [`Summary`] from them. Time is passed in so the arithmetic can be tested.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    started: Instant,
    summary: Summary,
    completed: usize,
}
impl ProgressTracker {
    pub(crate) fn new(total: usize, started: Instant) -> Self {
        Self { started, summary: Summary { total, ..Summary::default() }, completed: 0 }
    }

    pub(crate) fn record(&mut self, outcome: &CommitOutcome, now: Instant) -> Progress {
        self.completed += 1;
        match outcome {
            CommitOutcome::Committed(_) => self.summary.succeeded += 1,
            CommitOutcome::CommittedRenamed(_) => {
                self.summary.succeeded += 1;
                self.summary.renamed += 1;
            },
            CommitOutcome::SkippedNoName => self.summary.skipped += 1,
            CommitOutcome::Failed(_) => self.summary.failed += 1,
        }

        let total = self.summary.total;
        let elapsed = now.saturating_duration_since(self.started);
        let (throughput, eta) = if elapsed > ESTIMATE_AFTER {
            let throughput = self.completed as f64 / elapsed.as_secs_f64();
            let remaining = total.saturating_sub(self.completed) as f64;
            (Some(throughput), (throughput > 0.0).then(|| Duration::from_secs_f64(remaining / throughput)))
        } else {
            (None, None)
        };
        Progress { completed: self.completed, total, elapsed, throughput, eta }
    }

    pub(crate) fn finish(&self, now: Instant) -> Summary {
        let elapsed = now.saturating_duration_since(self.started);
        let seconds = elapsed.as_secs_f64();
        let throughput = if seconds > 0.0 { self.completed as f64 / seconds } else { 0.0 };
        Summary { elapsed, throughput, ..self.summary }
    }
}
