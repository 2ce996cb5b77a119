//! Durable block event log.

use crate::{Database, Result, StorageError};
use focusguard_events::BlockEvent;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Append-only record of block events.
pub trait BlockEventLog: Send + Sync {
    /// Open the underlying storage ahead of the first read or write.
    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    /// Append one row. Identical arguments produce identical, separate rows.
    fn append(&self, platform: &str, timestamp: i64) -> Result<()>;

    /// Number of events with `timestamp >= since`.
    fn count_since(&self, since: i64) -> Result<u64>;

    /// Up to `limit` events, newest first.
    fn most_recent(&self, limit: usize) -> Result<Vec<BlockEvent>>;
}

impl BlockEventLog for Database {
    fn append(&self, platform: &str, timestamp: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO block_events (platform, timestamp) VALUES (?1, ?2)",
            (platform, timestamp),
        )?;
        Ok(())
    }

    fn count_since(&self, since: i64) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM block_events WHERE timestamp >= ?1",
            [since],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn most_recent(&self, limit: usize) -> Result<Vec<BlockEvent>> {
        let conn = self.lock()?;
        // Ties on timestamp resolve to insertion order, newest first.
        let mut stmt = conn.prepare(
            "SELECT platform, timestamp FROM block_events ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok(BlockEvent {
                platform: row.get(0)?,
                timestamp: row.get(1)?,
            })
        })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}

/// Lazily opened event log.
///
/// The database is opened on the first call that needs it, or eagerly via
/// [`EventLogHandle::ensure_open`]. A `None` path means in-memory.
pub struct EventLogHandle {
    path: Option<PathBuf>,
    database: RwLock<Option<Arc<Database>>>,
}

impl EventLogHandle {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            database: RwLock::new(None),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            database: RwLock::new(None),
        }
    }

    /// Wrap an already open database.
    pub fn from_database(database: Arc<Database>) -> Self {
        Self {
            path: None,
            database: RwLock::new(Some(database)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.database
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Open the database if it is not open yet and return it.
    pub fn ensure_open(&self) -> Result<Arc<Database>> {
        if let Some(db) = self
            .database
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .as_ref()
        {
            return Ok(Arc::clone(db));
        }

        let mut guard = self
            .database
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if let Some(db) = guard.as_ref() {
            return Ok(Arc::clone(db));
        }

        let db = match &self.path {
            Some(path) => Database::open(path)?,
            None => Database::open_in_memory()?,
        };
        let db = Arc::new(db);
        *guard = Some(Arc::clone(&db));
        tracing::info!(path = ?self.path, "block event log initialized");
        Ok(db)
    }
}

impl BlockEventLog for EventLogHandle {
    fn prepare(&self) -> Result<()> {
        self.ensure_open().map(|_| ())
    }

    fn append(&self, platform: &str, timestamp: i64) -> Result<()> {
        self.ensure_open()?.append(platform, timestamp)
    }

    fn count_since(&self, since: i64) -> Result<u64> {
        self.ensure_open()?.count_since(since)
    }

    fn most_recent(&self, limit: usize) -> Result<Vec<BlockEvent>> {
        self.ensure_open()?.most_recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_opens_lazily() {
        let handle = EventLogHandle::in_memory();
        assert!(!handle.is_open());

        handle.append("TikTok", 10).unwrap();
        assert!(handle.is_open());
        assert_eq!(handle.count_since(0).unwrap(), 1);
    }

    #[test]
    fn test_prepare_opens_handle() {
        let handle = EventLogHandle::in_memory();
        handle.prepare().unwrap();
        assert!(handle.is_open());
        assert_eq!(handle.count_since(0).unwrap(), 0);
    }

    #[test]
    fn test_ensure_open_returns_same_database() {
        let handle = EventLogHandle::in_memory();
        let first = handle.ensure_open().unwrap();
        let second = handle.ensure_open().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_equal_timestamps_newest_insert_first() {
        let db = Database::open_in_memory().unwrap();
        db.append("first", 100).unwrap();
        db.append("second", 100).unwrap();

        let events = db.most_recent(2).unwrap();
        assert_eq!(events[0].platform, "second");
        assert_eq!(events[1].platform, "first");
    }
}
