//! Tracker configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default capacity of each subscriber's delivery queue.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 4;

/// Default keep-alive period on idle event streams.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Default period between snapshot archives.
pub const DEFAULT_SNAPSHOT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default number of snapshot archives kept.
pub const DEFAULT_SNAPSHOT_RETENTION: usize = 50;

/// Tracker configuration.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Base directory; relative file names below resolve against it.
    pub data_dir: PathBuf,

    /// Item collection document.
    pub items_file: PathBuf,

    /// Shared secret set document.
    pub config_file: PathBuf,

    /// Directory holding snapshot archives.
    pub backups_dir: PathBuf,

    /// Pending messages a subscriber may queue before it is evicted.
    pub subscriber_buffer: usize,

    pub keep_alive: Duration,

    pub snapshot_interval: Duration,

    /// Archives kept after each snapshot.
    pub snapshot_retention: usize,

    /// Whether to create `data_dir` and `backups_dir` if missing.
    pub create_if_missing: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            items_file: PathBuf::from("items.json"),
            config_file: PathBuf::from("config.json"),
            backups_dir: PathBuf::from("backups"),
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            keep_alive: DEFAULT_KEEP_ALIVE,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            snapshot_retention: DEFAULT_SNAPSHOT_RETENTION,
            create_if_missing: true,
        }
    }
}

impl TrackerConfig {
    /// Default configuration rooted at `dir`.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn items_path(&self) -> PathBuf {
        self.resolve(&self.items_file)
    }

    pub fn config_path(&self) -> PathBuf {
        self.resolve(&self.config_file)
    }

    pub fn backups_path(&self) -> PathBuf {
        self.resolve(&self.backups_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}
