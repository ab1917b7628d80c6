//! One-Shot Expiry
//!
//! Every upload gets its own deletion task. The task sleeps for the file's
//! time-to-live, then removes the bytes from disk and the entry from the
//! registry.
//!
//! ## Design
//!
//! ```text
//! upload ──> Reaper::schedule(name, ttl)
//!                 │
//!                 │ tokio::spawn
//!                 ▼
//!            sleep(ttl) ──> expire_and_delete(name)
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!         remove_file failed             remove_file ok
//!         log, keep entry                registry.remove(name)
//! ```
//!
//! Scheduled tasks are never cancelled or rescheduled. They are lost on
//! restart, together with the registry.
//!
//! Downloads already refuse the file once its expiry has passed, so the gap
//! between deleting the bytes and dropping the entry is not observable.

use crate::storage::{FileStore, Registry};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What a single expiry run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaped {
    /// Bytes removed and entry dropped
    Deleted,
    /// Removing the bytes failed; the entry was left in place
    Failed,
}

/// Deletes expired uploads.
#[derive(Debug)]
pub struct Reaper {
    registry: Arc<Registry>,
    store: FileStore,

    /// Tasks scheduled and not yet finished
    pending: AtomicU64,
}

impl Reaper {
    /// Creates a reaper over the given registry and store.
    pub fn new(registry: Arc<Registry>, store: FileStore) -> Self {
        Self {
            registry,
            store,
            pending: AtomicU64::new(0),
        }
    }

    /// Schedules `name` for deletion after `delay`.
    ///
    /// The returned handle may be dropped; the task keeps running.
    pub fn schedule(self: &Arc<Self>, name: String, delay: Duration) -> JoinHandle<Reaped> {
        self.pending.fetch_add(1, Ordering::Relaxed);
        debug!(file = %name, delay_secs = delay.as_secs(), "Scheduled expiry");

        let reaper = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = reaper.expire_and_delete(&name).await;
            reaper.pending.fetch_sub(1, Ordering::Relaxed);
            outcome
        })
    }

    /// Removes `name` from disk, then from the registry.
    ///
    /// Failure to remove the bytes is logged and leaves the entry alone.
    pub async fn expire_and_delete(&self, name: &str) -> Reaped {
        if let Err(e) = self.store.remove(name).await {
            warn!(file = %name, error = %e, "Error deleting file");
            return Reaped::Failed;
        }

        self.registry.remove(name);
        info!(file = %name, "File deleted");
        Reaped::Deleted
    }

    /// Returns the number of deletions still waiting to fire.
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Entry;
    use std::time::SystemTime;

    fn setup() -> (tempfile::TempDir, Arc<Registry>, Arc<Reaper>) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(Registry::new());
        let reaper = Arc::new(Reaper::new(
            Arc::clone(&registry),
            FileStore::new(dir.path()),
        ));
        (dir, registry, reaper)
    }

    fn register(registry: &Registry, name: &str) {
        registry.register(name, Entry::with_ttl(SystemTime::now(), Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_expire_and_delete() {
        let (dir, registry, reaper) = setup();
        std::fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        register(&registry, "a.txt");

        assert_eq!(reaper.expire_and_delete("a.txt").await, Reaped::Deleted);
        assert!(!dir.path().join("a.txt").exists());
        assert!(!registry.contains("a.txt"));
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_entry() {
        let (_dir, registry, reaper) = setup();
        register(&registry, "never-written.txt");

        assert_eq!(
            reaper.expire_and_delete("never-written.txt").await,
            Reaped::Failed
        );
        assert!(registry.contains("never-written.txt"));
    }

    #[tokio::test]
    async fn test_scheduled_deletion_fires_once() {
        let (dir, registry, reaper) = setup();
        std::fs::write(dir.path().join("b.bin"), b"xyz").unwrap();
        register(&registry, "b.bin");

        let handle = reaper.schedule("b.bin".to_string(), Duration::from_millis(50));
        assert_eq!(reaper.pending(), 1);

        // Not yet
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(dir.path().join("b.bin").exists());

        assert_eq!(handle.await.unwrap(), Reaped::Deleted);
        assert_eq!(reaper.pending(), 0);
        assert!(!dir.path().join("b.bin").exists());
        assert!(registry.is_empty());
    }
}
