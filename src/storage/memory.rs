//! In-memory backend

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{Backend, CollectionKey, StorageError, Stored};

#[derive(Debug)]
pub struct MemoryBackend {
    name: &'static str,
    entries: RefCell<HashMap<String, Stored>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn read(&self, key: &CollectionKey) -> Result<Option<Stored>, StorageError> {
        Ok(self.entries.borrow().get(&key.to_string()).cloned())
    }

    fn write(
        &self,
        key: &CollectionKey,
        payload: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(
            key.to_string(),
            Stored {
                payload: payload.to_string(),
                saved_at,
            },
        );
        Ok(())
    }
}
