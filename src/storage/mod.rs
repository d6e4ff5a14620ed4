//! Persistence port
//!
//! Collections are stored whole, as a JSON array, under a key made of the
//! collection name and the owning user. A [`Backend`] only knows how to read and
//! write those payloads; [`Persistence`] chains backends in priority order and
//! falls back to the next one when a backend fails.
//!
//! Every payload carries the time it was saved. Reads consult the whole chain
//! and keep the newest copy, so a save that landed on a fallback is not masked
//! by an older copy in the primary once the primary recovers.

pub mod file;
pub mod memory;
pub mod sqlite;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

pub use file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Owner scope used when nobody is signed in
pub const DEFAULT_OWNER: &str = "default";

/// Kind of persisted collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Cases,
    Reports,
    Prosecutors,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Cases => "cases",
            Collection::Reports => "reports",
            Collection::Prosecutors => "prosecutors",
        }
    }

    /// Name of a single record, for messages
    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Cases => "case",
            Collection::Reports => "report",
            Collection::Prosecutors => "prosecutor",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage key: `<collection>_<owner>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey {
    collection: Collection,
    owner: String,
}

impl CollectionKey {
    pub fn new(collection: Collection, owner: impl Into<String>) -> Self {
        Self {
            collection,
            owner: owner.into(),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.collection, self.owner)
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to encode collection: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode collection '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Backend '{0}' is unavailable")]
    Unavailable(String),
}

/// A payload as a backend holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    pub payload: String,
    pub saved_at: DateTime<Utc>,
}

/// A key-value store holding serialized collections
pub trait Backend {
    /// Short name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Read the payload stored under `key`, or `None` if nothing was stored
    fn read(&self, key: &CollectionKey) -> Result<Option<Stored>, StorageError>;

    /// Replace the payload stored under `key`, recording `saved_at` with it
    fn write(
        &self,
        key: &CollectionKey,
        payload: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Where a save ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written by the backend with this name
    Saved(&'static str),
    /// No backend accepted the write
    Failed,
    /// Not attempted: the stored collection could not be read in full, so the
    /// in-memory copy may be missing records
    Withheld,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

/// Ordered chain of backends with fallback on failure
///
/// Reads return the newest payload that decodes, ties going to the earlier
/// backend; writes stop at the first backend that accepts them. Failures are
/// logged and never surface to the caller: the in-memory collection stays
/// authoritative.
///
/// A key whose last load hit a read error is marked unreadable. Saving it is
/// withheld until the chain reads cleanly again and holds nothing newer than
/// what was loaded, so a partial load never overwrites the stored collection.
pub struct Persistence {
    backends: Vec<Box<dyn Backend>>,
    /// Newest stamp loaded or written per key
    seen: RefCell<HashMap<CollectionKey, DateTime<Utc>>>,
    unreadable: RefCell<HashSet<CollectionKey>>,
}

impl Persistence {
    pub fn new(backends: Vec<Box<dyn Backend>>) -> Self {
        Self {
            backends,
            seen: RefCell::new(HashMap::new()),
            unreadable: RefCell::new(HashSet::new()),
        }
    }

    /// Single in-memory backend, for tests and throwaway sessions
    pub fn in_memory() -> Self {
        Self::new(vec![Box::new(MemoryBackend::new())])
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Load a collection; empty if absent everywhere or if every backend fails
    pub fn load<T: DeserializeOwned>(&self, key: &CollectionKey) -> Vec<T> {
        let mut newest: Option<(DateTime<Utc>, &'static str, Vec<T>)> = None;
        let mut read_failed = false;

        for backend in &self.backends {
            match backend.read(key) {
                Ok(Some(stored)) => match serde_json::from_str::<Vec<T>>(&stored.payload) {
                    Ok(items) => {
                        if newest.as_ref().map_or(true, |(at, _, _)| stored.saved_at > *at) {
                            newest = Some((stored.saved_at, backend.name(), items));
                        }
                    }
                    Err(source) => {
                        let err = StorageError::Decode {
                            key: key.to_string(),
                            source,
                        };
                        warn!(backend = backend.name(), error = %err, "skipping unreadable collection");
                    }
                },
                Ok(None) => {
                    debug!(key = %key, backend = backend.name(), "collection not present");
                }
                Err(err) => {
                    read_failed = true;
                    warn!(key = %key, backend = backend.name(), error = %err, "read failed, trying next backend");
                }
            }
        }

        if read_failed {
            self.unreadable.borrow_mut().insert(key.clone());
        } else {
            self.unreadable.borrow_mut().remove(key);
        }

        match newest {
            Some((saved_at, backend, items)) => {
                debug!(key = %key, backend, count = items.len(), %saved_at, "loaded collection");
                self.seen.borrow_mut().insert(key.clone(), saved_at);
                items
            }
            None => {
                self.seen.borrow_mut().remove(key);
                Vec::new()
            }
        }
    }

    /// Save a whole collection, falling back through the chain on failure
    pub fn save<T: Serialize>(&self, key: &CollectionKey, items: &[T]) -> SaveOutcome {
        if !self.safe_to_overwrite(key) {
            error!(key = %key, "stored collection was not fully read; changes are kept in memory only");
            return SaveOutcome::Withheld;
        }

        let payload = match serde_json::to_string(items) {
            Ok(p) => p,
            Err(e) => {
                error!(key = %key, error = %StorageError::Encode(e), "could not encode collection");
                return SaveOutcome::Failed;
            }
        };
        let saved_at = self.next_stamp(key);

        for backend in &self.backends {
            match backend.write(key, &payload, saved_at) {
                Ok(()) => {
                    debug!(key = %key, backend = backend.name(), count = items.len(), "saved collection");
                    self.seen.borrow_mut().insert(key.clone(), saved_at);
                    return SaveOutcome::Saved(backend.name());
                }
                Err(err) => {
                    warn!(key = %key, backend = backend.name(), error = %err, "write failed, falling back");
                }
            }
        }

        error!(key = %key, "every storage backend failed; changes are kept in memory only");
        SaveOutcome::Failed
    }

    /// Strictly later than anything loaded or written for `key`
    fn next_stamp(&self, key: &CollectionKey) -> DateTime<Utc> {
        let now = Utc::now();
        match self.seen.borrow().get(key) {
            Some(last) if now <= *last => *last + TimeDelta::nanoseconds(1),
            _ => now,
        }
    }

    /// Re-check an unreadable key: every backend must answer, and none may
    /// hold a copy newer than the one loaded
    fn safe_to_overwrite(&self, key: &CollectionKey) -> bool {
        if !self.unreadable.borrow().contains(key) {
            return true;
        }
        let loaded = self.seen.borrow().get(key).copied();
        for backend in &self.backends {
            match backend.read(key) {
                Ok(Some(stored)) if loaded.map_or(true, |at| stored.saved_at > at) => {
                    warn!(key = %key, backend = backend.name(), "backend holds a newer copy than the one loaded");
                    return false;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(key = %key, backend = backend.name(), error = %err, "read still failing");
                    return false;
                }
            }
        }
        self.unreadable.borrow_mut().remove(key);
        true
    }
}
