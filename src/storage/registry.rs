//! In-Memory File Registry
//!
//! The registry maps each generated file name to the moment it stops being
//! downloadable. It is the only shared mutable state in the relay.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                Registry                  │
//! │  ┌────────────────────────────────────┐  │
//! │  │ Mutex<HashMap<String, Entry>>      │  │
//! │  └────────────────────────────────────┘  │
//! │  registered │ removed │ lookups │ expired│  (atomics)
//! └──────────────────────────────────────────┘
//! ```
//!
//! The lock is taken for the map access alone. Callers do their disk I/O
//! before or after, never while holding it.
//!
//! ## Logical Expiry
//!
//! Lookups compare `expires_at` with the caller's `now`. An entry whose time
//! has passed is reported as absent even though it is still in the map; the
//! reaper removes it later, after the bytes are gone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

/// A registered upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// When the upload was registered
    pub registered_at: SystemTime,
    /// The first instant at which the file is no longer served
    pub expires_at: SystemTime,
}

impl Entry {
    /// Creates an entry that lives for `ttl` starting at `now`.
    pub fn with_ttl(now: SystemTime, ttl: Duration) -> Self {
        Self {
            registered_at: now,
            expires_at: now + ttl,
        }
    }

    /// Checks if this entry is expired at `now`.
    ///
    /// Expiry is inclusive: at exactly `expires_at` the entry is gone.
    #[inline]
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }

    /// Returns the remaining lifetime at `now`, zero once expired.
    pub fn remaining(&self, now: SystemTime) -> Duration {
        self.expires_at.duration_since(now).unwrap_or(Duration::ZERO)
    }
}

/// Registry statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Entries currently held, expired or not
    pub entries: u64,
    /// Total entries ever registered
    pub registered: u64,
    /// Total entries removed by the reaper
    pub removed: u64,
    /// Total lookups
    pub lookups: u64,
    /// Lookups that found an entry past its expiry
    pub expired_hits: u64,
}

/// Process-wide mapping from generated file name to expiry.
///
/// Wrap it in an `Arc` and share it between request handlers and expiry
/// tasks.
///
/// # Example
///
/// ```
/// use simplehost::storage::{Entry, Registry};
/// use std::time::{Duration, SystemTime};
///
/// let registry = Registry::new();
/// let now = SystemTime::now();
///
/// registry.register("simplehost-1.txt", Entry::with_ttl(now, Duration::from_secs(60)));
/// assert!(registry.lookup("simplehost-1.txt", now).is_some());
///
/// // Logically expired, although still held
/// let later = now + Duration::from_secs(60);
/// assert!(registry.lookup("simplehost-1.txt", later).is_none());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    files: Mutex<HashMap<String, Entry>>,

    registered: AtomicU64,
    removed: AtomicU64,
    lookups: AtomicU64,
    expired_hits: AtomicU64,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the map. A panic in another holder cannot leave the map in a
    /// half-updated state, so a poisoned lock is recovered.
    #[inline]
    fn files(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Publishes an entry.
    ///
    /// # Returns
    ///
    /// Returns `true` if the name was new, `false` if an existing entry was
    /// replaced.
    pub fn register(&self, name: impl Into<String>, entry: Entry) -> bool {
        self.registered.fetch_add(1, Ordering::Relaxed);
        self.files().insert(name.into(), entry).is_none()
    }

    /// Returns the entry for `name` if it exists and is not expired at `now`.
    pub fn lookup(&self, name: &str, now: SystemTime) -> Option<Entry> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let entry = self.files().get(name).cloned()?;
        if entry.is_expired_at(now) {
            self.expired_hits.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        Some(entry)
    }

    /// Returns true if `name` is held, whether or not it has expired.
    pub fn contains(&self, name: &str) -> bool {
        self.files().contains_key(name)
    }

    /// Removes the entry for `name`.
    pub fn remove(&self, name: &str) -> Option<Entry> {
        let removed = self.files().remove(name);
        if removed.is_some() {
            self.removed.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Returns the number of entries held, including logically expired ones.
    pub fn len(&self) -> usize {
        self.files().len()
    }

    /// Returns true if the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns registry statistics.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            entries: self.len() as u64,
            registered: self.registered.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            expired_hits: self.expired_hits.load(Ordering::Relaxed),
        }
    }
}
