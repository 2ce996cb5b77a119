//! Local persistence for FocusGuard.
//!
//! Two stores live in one SQLite file:
//! - the durable block event log (`block_events`), append-only
//! - the settings store (`settings`), string keys mapped to boolean flags
//!
//! Each has its own trait so callers can substitute in-memory doubles.

mod log;
mod settings;

pub use log::{BlockEventLog, EventLogHandle};
pub use settings::{
    read_platform_settings, read_protection_active, write_platform_settings,
    write_protection_active, MemorySettingsStore, SettingsStore, KEY_BLOCK_FACEBOOK_REELS,
    KEY_BLOCK_INSTAGRAM_REELS, KEY_BLOCK_SNAPCHAT_SPOTLIGHT, KEY_BLOCK_TIKTOK,
    KEY_BLOCK_YOUTUBE_SHORTS, KEY_PROTECTION_ACTIVE,
};

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StorageError>;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS block_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                platform TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_block_events_timestamp ON block_events(timestamp DESC);
            "#,
        )?;
        Ok(())
    }
}
