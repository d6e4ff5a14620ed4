//! JSON file backend (fallback)
//!
//! One `<key>.json` file per collection under a directory. Each file holds
//! `{"saved_at": ..., "items": [...]}`; bare arrays are read with the oldest
//! possible stamp.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Backend, CollectionKey, StorageError, Stored};

/// Directory name for collection files inside the data directory
pub const COLLECTIONS_DIR: &str = "collections";

pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &CollectionKey) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(&key.to_string())))
    }
}

/// Keep file names portable; owner ids are ULID based but `default` and
/// hand-written owners may contain anything
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FileContent {
    Stamped { saved_at: DateTime<Utc>, items: Value },
    Bare(Value),
}

impl Backend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn read(&self, key: &CollectionKey) -> Result<Option<Stored>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        let stored = match serde_json::from_str::<FileContent>(&raw) {
            Ok(FileContent::Stamped { saved_at, items }) => Stored {
                payload: items.to_string(),
                saved_at,
            },
            // Leave undecodable text to the caller, which reports it per key
            Ok(FileContent::Bare(_)) | Err(_) => Stored {
                payload: raw,
                saved_at: DateTime::<Utc>::MIN_UTC,
            },
        };
        Ok(Some(stored))
    }

    fn write(
        &self,
        key: &CollectionKey,
        payload: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let items: Value = serde_json::from_str(payload).map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })?;
        let content = serde_json::to_string_pretty(&FileContent::Stamped { saved_at, items })
            .map_err(StorageError::Encode)?;

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
