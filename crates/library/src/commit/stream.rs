use crate::audit::{Action, AuditLog, BATCH_SUBJECT};
use crate::commit::file::commit_record;
use crate::commit::progress::{Progress, ProgressTracker, Summary};
use crate::record::{CommitOutcome, Record, RecordId};
use async_stream::stream;
use futures::Stream;
use movr_storage::BackendHandle;
use std::time::Instant;
use tracing::{info, warn};

/// Progress events emitted by [`commit`] as it works through a batch.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`Progress`](Self::Progress): once per record, in batch order.
/// 3. [`Complete`](Self::Complete): exactly once, with the run's tally.
///
/// Per-record failures are reported through the record's
/// [`CommitOutcome`]; they never end the stream early.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitEvent {
    /// Committing has begun. Every outcome has been reset to pending.
    Started { total: usize },
    /// A record has reached its outcome.
    Progress { record: RecordId, outcome: CommitOutcome, progress: Progress },
    /// Every record has been dealt with; the stream is finished.
    Complete(Summary),
}

/// Streams [`CommitEvent`]s while copying every record in `records` into
/// `backend`, one at a time and in order.
///
/// The slice is held mutably until the stream is dropped, so nothing else can
/// change a record's outcome mid-run. Each outcome is stored on its record
/// before the matching event is yielded. The task yields to the scheduler
/// between records.
pub fn commit<'a>(
    records: &'a mut [Record],
    backend: &'a BackendHandle,
    audit: &'a dyn AuditLog,
) -> impl Stream<Item = CommitEvent> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        records.iter_mut().for_each(Record::reset_outcome);
        let total = records.len();
        info!(total, backend = backend.name(), "commit started");
        yield CommitEvent::Started { total };

        let mut tracker = ProgressTracker::new(total, Instant::now());
        for record in records.iter_mut() {
            let outcome = commit_record(backend, record).await;
            let subject = record.asset().filename();
            let action = match &outcome {
                CommitOutcome::Committed(path) => {
                    info!(source = subject, path = %path.display(), "committed");
                    Action::Committed
                },
                CommitOutcome::CommittedRenamed(path) => {
                    info!(source = subject, path = %path.display(), "committed under a new name");
                    Action::CommittedRenamed
                },
                CommitOutcome::SkippedNoName => {
                    warn!(source = subject, "skipped, no canonical name");
                    Action::Skipped
                },
                CommitOutcome::Failed(reason) => {
                    warn!(source = subject, reason, "commit failed");
                    Action::Failed
                },
            };
            audit.record(action, subject, &outcome.to_string());
            record.set_outcome(outcome.clone());

            let progress = tracker.record(&outcome, Instant::now());
            yield CommitEvent::Progress { record: record.id(), outcome, progress };
            tokio::task::yield_now().await;
        }

        let summary = tracker.finish(Instant::now());
        info!(succeeded = summary.succeeded, errors = summary.errors(), "commit complete");
        audit.record(Action::Complete, BATCH_SUBJECT, &summary.to_string());
        yield CommitEvent::Complete(summary);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;
    use crate::record::{Edit, RawAsset};
    use futures::StreamExt;
    use movr_extract::models::ImageType;
    use movr_storage::backend::{LocalBackend, MockBackend};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    struct Fixture {
        _sources: tempfile::TempDir,
        records: Vec<Record>,
    }

    /// Writes each `(filename, image type)` as a source file and imports it.
    fn fixture(files: &[(&str, ImageType)]) -> Fixture {
        let sources = tempfile::tempdir().unwrap();
        let records = files
            .iter()
            .enumerate()
            .map(|(i, (filename, image_type))| {
                let path = sources.path().join(filename);
                std::fs::write(&path, filename.as_bytes()).unwrap();
                Record::new(RecordId(i as u64), RawAsset::new(path).unwrap(), *image_type)
            })
            .collect();
        Fixture { _sources: sources, records }
    }

    async fn run(records: &mut [Record], backend: &BackendHandle, audit: &dyn AuditLog) -> Vec<CommitEvent> {
        commit(records, backend, audit).collect().await
    }

    fn summary(events: &[CommitEvent]) -> Summary {
        match events.last() {
            Some(CommitEvent::Complete(summary)) => *summary,
            _ => panic!("stream did not complete"),
        }
    }

    #[tokio::test]
    async fn test_event_order() {
        let mut fx = fixture(&[
            ("MO123456_K123456_005.jpg", ImageType::Lifestyle),
            ("DSC_0001.jpg", ImageType::Lifestyle),
        ]);
        let backend: BackendHandle = Arc::new(MockBackend::default());
        let audit = MemoryAuditLog::new();

        let events = run(&mut fx.records, &backend, &audit).await;
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], CommitEvent::Started { total: 2 });
        let CommitEvent::Progress { record, progress, .. } = &events[1] else {
            panic!("expected progress");
        };
        assert_eq!((*record, progress.completed, progress.total), (RecordId(0), 1, 2));
        let CommitEvent::Progress { outcome, .. } = &events[2] else {
            panic!("expected progress");
        };
        assert_eq!(outcome, &CommitOutcome::SkippedNoName);
        assert_eq!(summary(&events).succeeded, 1);
        assert_eq!(summary(&events).skipped, 1);
    }

    #[tokio::test]
    async fn test_end_to_end_canonical_name() {
        let mut fx = fixture(&[("MO123456_K123456_005.jpg", ImageType::Lifestyle)]);
        let destination = tempfile::tempdir().unwrap();
        let backend: BackendHandle = Arc::new(LocalBackend::new("local", destination.path()).unwrap());
        let audit = MemoryAuditLog::new();

        run(&mut fx.records, &backend, &audit).await;
        let expected = Path::new("Lifestyle Images/IMG_QVC_PH_LS_MO123456_K123456_005.jpg");
        assert_eq!(fx.records[0].outcome(), Some(&CommitOutcome::Committed(expected.to_path_buf())));
        assert_eq!(std::fs::read(destination.path().join(expected)).unwrap(), b"MO123456_K123456_005.jpg");
        assert!(fx.records[0].asset().path().exists());
    }

    #[tokio::test]
    async fn test_same_name_collision_within_run() {
        // Different sources, identical canonical names.
        let mut fx = fixture(&[
            ("MO123456_K123456 a.jpg", ImageType::Product),
            ("MO123456_K123456 b.jpg", ImageType::Product),
        ]);
        let destination = tempfile::tempdir().unwrap();
        let backend: BackendHandle = Arc::new(LocalBackend::new("local", destination.path()).unwrap());
        let audit = MemoryAuditLog::new();

        let events = run(&mut fx.records, &backend, &audit).await;
        let canonical = PathBuf::from("Product Images/IMG_QVC_PH_PR_MO123456_K123456.jpg");
        assert_eq!(fx.records[0].outcome(), Some(&CommitOutcome::Committed(canonical.clone())));
        let Some(CommitOutcome::CommittedRenamed(renamed)) = fx.records[1].outcome() else {
            panic!("second record should have been renamed");
        };
        assert_ne!(renamed, &canonical);
        assert_eq!(std::fs::read(destination.path().join(&canonical)).unwrap(), b"MO123456_K123456 a.jpg");
        assert_eq!(std::fs::read(destination.path().join(renamed)).unwrap(), b"MO123456_K123456 b.jpg");
        assert_eq!(std::fs::read_dir(destination.path().join("Product Images")).unwrap().count(), 2);
        let summary = summary(&events);
        assert_eq!((summary.succeeded, summary.renamed, summary.errors()), (2, 1, 0));
    }

    #[tokio::test]
    async fn test_partial_failure_counts() {
        let mut fx = fixture(&[
            ("MO100001_K100001_001.jpg", ImageType::Lifestyle),
            ("MO100002_K100002 a.jpg", ImageType::Product),
            ("MO100003_K100003_003.jpg", ImageType::Lifestyle),
            ("MO100004_K100004 b.jpg", ImageType::Product),
            ("MO100005_K100005 c.jpg", ImageType::Headshot),
        ]);
        let destination = tempfile::tempdir().unwrap();
        // A plain file where the product folder should go makes it uncreatable.
        std::fs::write(destination.path().join("Product Images"), b"not a folder").unwrap();
        let backend: BackendHandle = Arc::new(LocalBackend::new("local", destination.path()).unwrap());
        let audit = MemoryAuditLog::new();

        let events = run(&mut fx.records, &backend, &audit).await;
        let summary = summary(&events);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.errors(), 2);
        for record in &fx.records {
            let failed = matches!(record.outcome(), Some(CommitOutcome::Failed(_)));
            assert_eq!(failed, record.image_type() == ImageType::Product);
        }
        assert!(destination.path().join("Headshots/IMG_QVC_PH_HS_MO100005_K100005.jpg").exists());
    }

    #[tokio::test]
    async fn test_partial_failure_with_mock() {
        let mut fx = fixture(&[
            ("MO100001_K100001_001.jpg", ImageType::Lifestyle),
            ("MO100002_K100002 a.jpg", ImageType::Product),
            ("DSC_0003.jpg", ImageType::Lifestyle),
        ]);
        let mock = Arc::new(MockBackend::default().deny("Product Images"));
        let backend: BackendHandle = mock.clone();
        let audit = MemoryAuditLog::new();

        let summary = summary(&run(&mut fx.records, &backend, &audit).await);
        assert_eq!((summary.succeeded, summary.failed, summary.skipped, summary.errors()), (1, 1, 1, 2));
        let committed = PathBuf::from("Lifestyle Images/IMG_QVC_PH_LS_MO100001_K100001_001.jpg");
        assert_eq!(mock.paths().await, vec![committed]);
    }

    #[tokio::test]
    async fn test_rerun_never_commits_twice() {
        let mut fx = fixture(&[
            ("MO123456_K123456_005.jpg", ImageType::Lifestyle),
            ("MO123456_K654321 x.jpg", ImageType::Headshot),
        ]);
        let destination = tempfile::tempdir().unwrap();
        let backend: BackendHandle = Arc::new(LocalBackend::new("local", destination.path()).unwrap());
        let audit = MemoryAuditLog::new();

        run(&mut fx.records, &backend, &audit).await;
        assert!(fx.records.iter().all(|r| matches!(r.outcome(), Some(CommitOutcome::Committed(_)))));

        let events = run(&mut fx.records, &backend, &audit).await;
        assert!(fx.records.iter().all(|r| matches!(r.outcome(), Some(CommitOutcome::CommittedRenamed(_)))));
        assert_eq!(summary(&events).renamed, 2);
        assert_eq!(std::fs::read_dir(destination.path().join("Lifestyle Images")).unwrap().count(), 2);
        assert_eq!(std::fs::read_dir(destination.path().join("Headshots")).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_outcomes_reset_at_start() {
        let mut fx = fixture(&[("MO123456_K123456_005.jpg", ImageType::Lifestyle)]);
        let backend: BackendHandle = Arc::new(MockBackend::default());
        let audit = MemoryAuditLog::new();
        run(&mut fx.records, &backend, &audit).await;
        assert!(fx.records[0].outcome().is_some());

        let mut stream = Box::pin(commit(&mut fx.records, &backend, &audit));
        assert_eq!(stream.next().await, Some(CommitEvent::Started { total: 1 }));
        drop(stream);
        assert_eq!(fx.records[0].outcome(), None);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let mut fx = fixture(&[
            ("MO123456_K123456 a.jpg", ImageType::Product),
            ("MO123456_K123456 b.jpg", ImageType::Product),
        ]);
        let destination = tempfile::tempdir().unwrap();
        let local: BackendHandle = Arc::new(LocalBackend::new("local", destination.path()).unwrap());
        let backend: BackendHandle = Arc::new(movr_storage::backend::ReadOnlyBackend::new(local));
        let audit = MemoryAuditLog::new();

        let summary = summary(&run(&mut fx.records, &backend, &audit).await);
        assert_eq!((summary.succeeded, summary.renamed), (2, 1));
        assert_eq!(std::fs::read_dir(destination.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_audit_entries_per_transition() {
        let mut fx = fixture(&[
            ("MO123456_K123456_005.jpg", ImageType::Lifestyle),
            ("DSC_0001.jpg", ImageType::Lifestyle),
        ]);
        fx.records[1].apply(Edit::Retouched(true));
        let backend: BackendHandle = Arc::new(MockBackend::default());
        let audit = MemoryAuditLog::new();

        run(&mut fx.records, &backend, &audit).await;
        let entries = audit.entries();
        let actions: Vec<_> = entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["File Processed", "File Skipped", "Processing Complete"]);
        assert_eq!(entries[0].subject, "MO123456_K123456_005.jpg");
        assert_eq!(entries[1].result, "skipped: missing required information");
    }
}
