mod cli;
mod error;
mod logging;
mod progress;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use crate::progress::CommitProgress;
use clap::Parser;
use exn::ResultExt;
use futures::StreamExt;
use futures::future::BoxFuture;
use movr_cache::{Database, Repository};
use movr_config::Config;
use movr_extract::models::ImageType;
use movr_library::audit::{MemoryAuditLog, report};
use movr_library::queue::OperationQueue;
use movr_library::recent::RecentPaths;
use movr_library::validate::issues;
use movr_library::{CommitEvent, Session, Summary};
use movr_storage::BackendHandle;
use movr_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            debug!("{err:?}");
            eprintln!("error: {}", *err);
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Parse { files, image_type, json } => {
            parse(&files, image_type.unwrap_or(config.batch_type), json);
            Ok(ExitCode::SUCCESS)
        },
        Command::Commit { files, dest, image_type, threshold, dry_run, restore } => {
            let mut config = config;
            if let Some(image_type) = image_type {
                config.batch_type = image_type;
            }
            if let Some(threshold) = threshold {
                config.validation_threshold = threshold;
                config.validate().or_raise(|| ErrorKind::Config)?;
            }
            let summary = commit(&config, &files, dest, dry_run, restore).await?;
            Ok(if summary.failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        },
        Command::Log => {
            let (db, repo) = open(&config, false).await?;
            let entries = repo.audit_entries().await.or_raise(|| ErrorKind::Database)?;
            print!("{}", report(&entries));
            db.close().await;
            Ok(ExitCode::SUCCESS)
        },
        Command::Clear => {
            let (db, repo) = open(&config, false).await?;
            let cleared = repo.clear_session().await.or_raise(|| ErrorKind::Database)?;
            println!("forgot {cleared} saved files");
            db.close().await;
            Ok(ExitCode::SUCCESS)
        },
    }
}

async fn open(config: &Config, dry_run: bool) -> Result<(Database, Repository)> {
    let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Database)?;
    let repo = Repository::new(db.pool().clone(), dry_run);
    Ok((db, repo))
}

fn parse(files: &[PathBuf], image_type: ImageType, json: bool) {
    let mut session = Session::new(image_type, Arc::new(MemoryAuditLog::new()));
    let summary = session.import(files);
    if summary.unsupported > 0 {
        warn!(count = summary.unsupported, "skipped unsupported files");
    }
    for record in session.records() {
        let parsed = record.parsed();
        if json {
            let value = serde_json::json!({
                "file": record.asset().filename(),
                "company": parsed.company.map(|company| company.code()),
                "description": parsed.description,
                "request_id": parsed.request_id,
                "sequence": parsed.sequence,
                "image_type": record.image_type().slug(),
                "canonical_name": record.canonical_name(),
            });
            println!("{value}");
            continue;
        }
        println!("{}", record.asset().filename());
        println!("  parsed: {parsed}");
        match record.canonical_name() {
            Some(name) => println!("  name:   {name}"),
            None => {
                let problems: Vec<_> = issues(record).iter().map(ToString::to_string).collect();
                println!("  name:   ({})", problems.join(", "));
            },
        }
    }
}

/// Picks the destination root: the flag, then the configuration, then the
/// most recently used one.
fn destination(flag: Option<PathBuf>, config: &Config, recent: &RecentPaths) -> Result<PathBuf> {
    let dest = flag.or_else(|| config.destination.clone());
    let Some(dest) = dest.or_else(|| recent.most_recent().map(Path::to_path_buf)) else {
        exn::bail!(ErrorKind::NoDestination);
    };
    std::path::absolute(&dest).or_raise(|| ErrorKind::Destination(dest))
}

fn backend(dest: &Path, dry_run: bool) -> Result<BackendHandle> {
    // A dry run must not even create the destination root.
    if dry_run && !dest.is_dir() {
        exn::bail!(ErrorKind::Destination(dest.to_path_buf()));
    }
    let local = LocalBackend::new("local", dest).or_raise(|| ErrorKind::Destination(dest.to_path_buf()))?;
    let local: BackendHandle = Arc::new(local);
    Ok(if dry_run { Arc::new(ReadOnlyBackend::new(local)) } else { local })
}

async fn commit(
    config: &Config,
    files: &[PathBuf],
    dest: Option<PathBuf>,
    dry_run: bool,
    restore: bool,
) -> Result<Summary> {
    let (db, repo) = open(config, dry_run).await?;
    let mut recent = RecentPaths::load(&repo).await.or_raise(|| ErrorKind::Database)?;
    recent.prune_missing();
    let dest = destination(dest, config, &recent)?;
    let backend = backend(&dest, dry_run)?;

    let audit = Arc::new(MemoryAuditLog::new());
    let mut session = Session::new(config.batch_type, audit.clone());
    let imported = session.import(files);
    if imported.duplicates > 0 || imported.unsupported > 0 {
        warn!(duplicates = imported.duplicates, unsupported = imported.unsupported, "some files were not imported");
    }
    if restore {
        let restored = session.restore(&repo).await.or_raise(|| ErrorKind::Session)?;
        info!(restored = restored.restored, missing = restored.missing, "restored previous session");
    }

    if let Err(err) = session.validate(config.validation_threshold) {
        if let movr_library::error::ErrorKind::Refused(refused) = &*err {
            eprint!("{refused}");
        }
        // The refusal itself belongs in the audit trail.
        repo.append_audit(&audit.take()).await.or_raise(|| ErrorKind::Database)?;
        return Err(err.raise(ErrorKind::Session));
    }

    info!(files = session.len(), destination = %dest.display(), dry_run, "processing");
    let progress = CommitProgress::new();
    let mut summary = Summary::default();
    {
        let mut events = std::pin::pin!(session.commit(&backend));
        while let Some(event) = events.next().await {
            progress.update(&event);
            if let CommitEvent::Complete(complete) = event {
                summary = complete;
            }
        }
    }
    for record in session.records() {
        if let Some(outcome) = record.outcome() {
            println!("{}: {outcome}", record.asset().filename());
        }
    }
    println!("{summary}");

    persist(&repo, &session, &audit, recent, dest).await;
    if let Some(path) = &config.audit_report
        && !dry_run
    {
        let entries = repo.audit_entries().await.or_raise(|| ErrorKind::Database)?;
        tokio::fs::write(path, report(&entries)).await.or_raise(|| ErrorKind::Write(path.clone()))?;
    }
    db.close().await;
    Ok(summary)
}

/// Saves the session, the audit entries and the destination one after
/// another in the background, then waits for all of it to land. Failures are
/// logged; the files have already been copied by now.
async fn persist(repo: &Repository, session: &Session, audit: &MemoryAuditLog, mut recent: RecentPaths, dest: PathBuf) {
    let queue = OperationQueue::default();
    let snapshot = session.snapshot();
    let entries = audit.take();
    recent.add(dest);

    let operations: [BoxFuture<'static, ()>; 3] = [
        {
            let repo = repo.clone();
            Box::pin(async move {
                if let Err(err) = repo.save_session(&snapshot).await {
                    warn!(error = %*err, "could not save session");
                }
            })
        },
        {
            let repo = repo.clone();
            Box::pin(async move {
                if let Err(err) = repo.append_audit(&entries).await {
                    warn!(error = %*err, "could not save audit log");
                }
            })
        },
        {
            let repo = repo.clone();
            Box::pin(async move {
                if let Err(err) = recent.save(&repo).await {
                    warn!(error = %*err, "could not save recent destinations");
                }
            })
        },
    ];
    for operation in operations {
        if let Err(err) = queue.submit(operation).await {
            warn!(error = %*err, "could not queue save");
        }
    }
    queue.shutdown().await;
    debug!("session persisted");
}
