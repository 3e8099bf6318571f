//! Temporary file storage and the background cleanup sweep
//!
//! Files get request-unique names so concurrent requests never collide.
//! The sweep deletes by age without any locking; losing a race against an
//! in-flight request only costs that request its temp file.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Root directory for request temp files.
#[derive(Debug, Clone)]
pub struct TempStore {
    root: PathBuf,
}

impl TempStore {
    /// Create the store, making the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh path named `<prefix>-<uuid><extension>`. Nothing is created.
    pub fn allocate(&self, prefix: &str, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}-{}{}", prefix, Uuid::new_v4().simple(), extension))
    }
}

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub deleted: usize,
    pub failed: usize,
}

/// Delete a file, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn file_age(path: &Path, now: SystemTime) -> Option<Duration> {
    let metadata = std::fs::metadata(path).ok()?;
    let stamp = metadata.created().or_else(|_| metadata.modified()).ok()?;
    Some(now.duration_since(stamp).unwrap_or_default())
}

/// Walk `root` recursively and delete every file older than `max_age`.
pub fn sweep_once(root: &Path, max_age: Duration) -> SweepStats {
    let mut stats = SweepStats::default();
    let now = SystemTime::now();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                warn!("Cannot read {}: {}", dir.display(), err);
                stats.failed += 1;
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }

            match file_age(&path, now) {
                Some(age) if age > max_age => match remove_if_exists(&path) {
                    Ok(()) => {
                        debug!("Deleted expired temp file {}", path.display());
                        stats.deleted += 1;
                    }
                    Err(err) => {
                        warn!("Failed to delete {}: {}", path.display(), err);
                        stats.failed += 1;
                    }
                },
                _ => {}
            }
        }
    }

    stats
}

/// Run `sweep_once` every `interval` on the blocking pool, forever.
pub fn spawn_cleanup(root: PathBuf, interval: Duration, max_age: Duration) -> JoinHandle<()> {
    info!(
        "Temp cleanup every {:?} for files older than {:?} in {}",
        interval,
        max_age,
        root.display()
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let root = root.clone();
            match tokio::task::spawn_blocking(move || sweep_once(&root, max_age)).await {
                Ok(stats) if stats.deleted > 0 || stats.failed > 0 => {
                    info!(deleted = stats.deleted, failed = stats.failed, "Temp cleanup sweep");
                }
                Ok(_) => {}
                Err(err) => warn!("Temp cleanup sweep panicked: {}", err),
            }
        }
    })
}
