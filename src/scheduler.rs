//! Snapshot scheduler: periodic archives of the item collection.
//!
//! Archives are named `items-<UTC timestamp>.json` with a timestamp that
//! sorts lexicographically in time order and carries no `:`. After every
//! successful archive the oldest files beyond the retention cap are deleted.
//! Nothing here propagates errors: failures are logged and the loop goes on.

use crate::config::{DEFAULT_SNAPSHOT_INTERVAL, DEFAULT_SNAPSHOT_RETENTION};
use crate::persist;
use crate::store::ItemStore;
use chrono::{DateTime, Utc};
use crossbeam_channel::{select, tick, Sender};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const ARCHIVE_PREFIX: &str = "items-";
const ARCHIVE_SUFFIX: &str = ".json";

/// Snapshot scheduler configuration.
#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// Directory archives are written to.
    pub dir: PathBuf,

    pub interval: Duration,

    /// Max archives kept.
    pub retention: usize,
}

impl SnapshotConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            interval: DEFAULT_SNAPSHOT_INTERVAL,
            retention: DEFAULT_SNAPSHOT_RETENTION,
        }
    }
}

/// File name of the archive taken at `at`, e.g. `items-2025-12-04T10-09-24Z.json`.
pub fn archive_name(at: DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        ARCHIVE_PREFIX,
        at.format("%Y-%m-%dT%H-%M-%SZ"),
        ARCHIVE_SUFFIX
    )
}

fn is_archive_name(name: &str) -> bool {
    name.starts_with(ARCHIVE_PREFIX) && name.ends_with(ARCHIVE_SUFFIX)
}

/// Writes archives of an [`ItemStore`] and prunes old ones.
pub struct SnapshotScheduler {
    store: Arc<ItemStore>,
    config: SnapshotConfig,
}

impl SnapshotScheduler {
    pub fn new(store: Arc<ItemStore>, config: SnapshotConfig) -> Self {
        Self { store, config }
    }

    /// Take one archive now. See [`SnapshotScheduler::run_once_at`].
    pub fn run_once(&self) -> Option<PathBuf> {
        self.run_once_at(Utc::now())
    }

    /// Archive the current collection under the name for `at`, then prune.
    ///
    /// Returns the archive path, or `None` if the cycle was skipped (empty
    /// or unreadable store) or the write failed. An archive already taken
    /// in the same second is replaced.
    pub fn run_once_at(&self, at: DateTime<Utc>) -> Option<PathBuf> {
        let items = match self.store.load() {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                tracing::debug!("item store empty, skipping snapshot");
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "item store unreadable, skipping snapshot");
                return None;
            }
        };

        if let Err(e) = fs::create_dir_all(&self.config.dir) {
            tracing::warn!(error = %e, dir = %self.config.dir.display(), "snapshot dir unavailable");
            return None;
        }

        let path = self.config.dir.join(archive_name(at));
        if let Err(e) = persist::write_json(&path, &items) {
            tracing::warn!(error = %e, "snapshot write failed");
            return None;
        }
        tracing::info!(path = %path.display(), items = items.len(), "snapshot written");

        self.prune();
        Some(path)
    }

    /// Delete the oldest archives beyond the retention cap, one at a time.
    ///
    /// Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut archives = match self.list_archives() {
            Ok(archives) => archives,
            Err(e) => {
                tracing::warn!(error = %e, "cannot list snapshots");
                return 0;
            }
        };

        let excess = archives.len().saturating_sub(self.config.retention);
        let mut removed = 0;
        for name in archives.drain(..excess) {
            let path = self.config.dir.join(&name);
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(error = %e, path = %path.display(), "snapshot delete failed"),
            }
        }

        if removed > 0 {
            tracing::debug!(removed, "pruned old snapshots");
        }
        removed
    }

    /// Archive file names, oldest first.
    pub fn list_archives(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.config.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_archive_name(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Run on a background thread: once immediately, then every interval,
    /// until the returned handle is shut down or dropped.
    pub fn spawn(self) -> io::Result<SchedulerHandle> {
        let (shutdown, stop) = crossbeam_channel::bounded::<()>(1);

        let thread = thread::Builder::new()
            .name("snapshot-scheduler".into())
            .spawn(move || {
                tracing::info!(
                    interval_secs = self.config.interval.as_secs(),
                    retention = self.config.retention,
                    "snapshot scheduler started"
                );
                let ticker = tick(self.config.interval);
                self.run_once();
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            self.run_once();
                        }
                        recv(stop) -> _ => break,
                    }
                }
                tracing::info!("snapshot scheduler stopped");
            })?;

        Ok(SchedulerHandle {
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }
}

/// Handle to a running scheduler thread. Dropping it stops the thread.
pub struct SchedulerHandle {
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stop the scheduler and wait for an in-flight cycle to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Dropping the sender wakes the loop.
        self.shutdown.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("snapshot scheduler thread panicked");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
