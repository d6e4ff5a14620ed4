//! SQLite backend (primary)

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{Backend, CollectionKey, StorageError, Stored};

/// Database file name inside the data directory
pub const DB_FILE: &str = "casebook.db";

/// One row per collection key, holding the whole JSON payload
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }
}

impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn read(&self, key: &CollectionKey) -> Result<Option<Stored>, StorageError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT payload, updated_at FROM collections WHERE key = ?1",
                [key.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.map(|(payload, updated_at)| Stored {
            payload,
            saved_at: parse_stamp(&updated_at),
        }))
    }

    fn write(
        &self,
        key: &CollectionKey,
        payload: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            r#"
            INSERT INTO collections (key, payload, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
            "#,
            params![
                key.to_string(),
                payload,
                saved_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
            ],
        )?;
        Ok(())
    }
}

/// Unparseable stamps sort before every real save
fn parse_stamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
