//! Local persistence for trucks.
//!
//! Every truck lives in a single `SQLite` file under the storage root:
//!
//! ```text
//! <root>/
//!   trucks.sqlite    # One row per truck; nested fields stored as JSON text
//! ```

mod query;
mod truck;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;

use crate::config;
use crate::model::ValidationError;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("truck not found: {0}")]
    TruckNotFound(String),

    #[error("truck already exists: {0}")]
    TruckAlreadyExists(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("corrupt truck row: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS truck (
        id              TEXT PRIMARY KEY,
        name            TEXT NOT NULL,
        description     TEXT NOT NULL,
        cuisine_tags    TEXT NOT NULL,
        lat             REAL NOT NULL,
        lng             REAL NOT NULL,
        address         TEXT NOT NULL,
        neighborhood    TEXT,
        weekly_hours    TEXT NOT NULL,
        contact         TEXT NOT NULL,
        menu            TEXT,
        rating_average  REAL NOT NULL,
        rating_count    INTEGER NOT NULL,
        active          INTEGER NOT NULL,
        last_seen       TEXT NOT NULL,
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS truck_active ON truck (active);
";

/// Local `SQLite`-backed storage for trucks.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory and database schema are created if they don't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let storage = Self { root };
        storage.open_db()?;
        Ok(storage)
    }

    /// Returns the default storage root: `$CURBSIDE_HOME` or `~/.curbside/`.
    pub fn default_root() -> Option<PathBuf> {
        config::home_dir()
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join("trucks.sqlite")
    }

    /// Opens the database, applying the schema if needed.
    fn open_db(&self) -> Result<Connection> {
        let conn = Connection::open(self.db_path())?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use tempfile::TempDir;

    pub(crate) fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("curbside")).unwrap();
        (dir, storage)
    }

    #[test]
    fn new_creates_root_and_database() {
        let (dir, storage) = test_storage();
        assert!(dir.path().join("curbside").is_dir());
        assert!(storage.db_path().is_file());
    }

    #[test]
    fn reopening_existing_root_is_fine() {
        let (dir, _storage) = test_storage();
        let again = Storage::new(dir.path().join("curbside")).unwrap();
        assert_eq!(again.count().unwrap(), 0);
    }
}
