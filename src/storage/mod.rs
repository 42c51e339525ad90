//! Persistent storage using SQLite (rusqlite)
//!
//! This module provides:
//! - OS-standard data directory location (via `directories` crate)
//! - SQLite database with schema versioning
//! - A small key/value table for remembered settings
//! - The player-name history offered on the names screen

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current schema version. Bump this when making schema changes.
/// Version history:
/// - v1: meta and kv tables
const SCHEMA_VERSION: u32 = 1;

/// Key the player-name list is stored under.
const PLAYER_NAMES_KEY: &str = "player_names";

const DB_FILE: &str = "undercover.db";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not determine data directory")]
    NoDataDirectory,

    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchemaVersion { found: u32, supported: u32 },

    #[error("failed to create data directory: {0}")]
    CreateDirFailed(std::io::Error),

    #[error("stored value for {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Names typed on earlier sessions, offered again on the names screen.
///
/// Implementations never fail outward: a broken store reads as empty and
/// a failed write is logged and dropped.
pub trait NameHistory {
    fn load(&self) -> Vec<String>;
    fn save(&self, names: &[String]);
}

/// The main storage handle.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create the database in the OS-standard data directory.
    ///
    /// - Linux: `$XDG_DATA_HOME/undercover/` or `~/.local/share/undercover/`
    /// - macOS: `~/Library/Application Support/undercover/`
    pub fn open() -> Result<Self, StorageError> {
        Self::open_in(&Self::data_dir()?)
    }

    /// Open or create the database inside `dir`.
    pub fn open_in(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir).map_err(StorageError::CreateDirFailed)?;

        let conn = Connection::open(dir.join(DB_FILE))?;
        let storage = Storage { conn };
        storage.initialize_schema()?;
        tracing::debug!("storage opened in {}", dir.display());
        Ok(storage)
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let storage = Storage {
            conn: Connection::open_in_memory()?,
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    pub fn data_dir() -> Result<PathBuf, StorageError> {
        ProjectDirs::from("", "", "undercover")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StorageError::NoDataDirectory)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now_millis()],
        )?;
        Ok(())
    }

    /// Last saved player names, in seat order.
    pub fn player_names(&self) -> Result<Vec<String>, StorageError> {
        match self.get(PLAYER_NAMES_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: PLAYER_NAMES_KEY.to_string(),
                source,
            }),
        }
    }

    pub fn set_player_names(&self, names: &[String]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(names).map_err(|source| StorageError::Corrupt {
            key: PLAYER_NAMES_KEY.to_string(),
            source,
        })?;
        self.set(PLAYER_NAMES_KEY, &raw)
    }

    // Private helper methods

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;

        if current_version == 0 {
            self.create_schema_v1()?;
        } else if current_version > SCHEMA_VERSION {
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: u32 = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        Ok(version)
    }

    fn create_schema_v1(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            -- Meta table: schema version and creation time
            CREATE TABLE meta (
                schema_version INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            -- Key/value store, values are JSON
            CREATE TABLE kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO meta (schema_version, created_at) VALUES (?1, ?2)",
            params![SCHEMA_VERSION, now_millis()],
        )?;

        Ok(())
    }
}

impl NameHistory for Storage {
    fn load(&self) -> Vec<String> {
        self.player_names().unwrap_or_else(|e| {
            tracing::warn!("could not read player name history: {}", e);
            Vec::new()
        })
    }

    fn save(&self, names: &[String]) {
        if let Err(e) = self.set_player_names(names) {
            tracing::warn!("could not save player name history: {}", e);
        }
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
