//! Persistent settings store shared with the enforcement side.

use crate::{Database, Result, StorageError};
use focusguard_events::{Platform, PlatformSettings};
use std::collections::HashMap;
use std::sync::Mutex;

pub const KEY_PROTECTION_ACTIVE: &str = "protection_active";
pub const KEY_BLOCK_YOUTUBE_SHORTS: &str = "block_youtube_shorts";
pub const KEY_BLOCK_INSTAGRAM_REELS: &str = "block_instagram_reels";
pub const KEY_BLOCK_FACEBOOK_REELS: &str = "block_facebook_reels";
pub const KEY_BLOCK_TIKTOK: &str = "block_tiktok";
pub const KEY_BLOCK_SNAPCHAT_SPOTLIGHT: &str = "block_snapchat_spotlight";

/// String-keyed boolean flags.
///
/// The store does not validate combinations: writing `protection_active = true`
/// without an accessibility grant is accepted.
pub trait SettingsStore: Send + Sync {
    /// Read a flag, falling back to `default` when it was never written.
    fn get_bool(&self, key: &str, default: bool) -> Result<bool>;

    /// Write several flags as one batch.
    fn put_bools(&self, entries: &[(&str, bool)]) -> Result<()>;
}

fn platform_key(platform: Platform) -> &'static str {
    match platform {
        Platform::YoutubeShorts => KEY_BLOCK_YOUTUBE_SHORTS,
        Platform::InstagramReels => KEY_BLOCK_INSTAGRAM_REELS,
        Platform::FacebookReels => KEY_BLOCK_FACEBOOK_REELS,
        Platform::Tiktok => KEY_BLOCK_TIKTOK,
        Platform::SnapchatSpotlight => KEY_BLOCK_SNAPCHAT_SPOTLIGHT,
    }
}

pub fn read_protection_active(store: &dyn SettingsStore) -> Result<bool> {
    store.get_bool(KEY_PROTECTION_ACTIVE, false)
}

pub fn write_protection_active(store: &dyn SettingsStore, active: bool) -> Result<()> {
    store.put_bools(&[(KEY_PROTECTION_ACTIVE, active)])
}

pub fn read_platform_settings(store: &dyn SettingsStore) -> Result<PlatformSettings> {
    let mut settings = PlatformSettings::default();
    for platform in Platform::ALL {
        settings.set(platform, store.get_bool(platform_key(platform), true)?);
    }
    Ok(settings)
}

pub fn write_platform_settings(store: &dyn SettingsStore, settings: &PlatformSettings) -> Result<()> {
    let entries: Vec<(&str, bool)> = Platform::ALL
        .into_iter()
        .map(|p| (platform_key(p), settings.get(p)))
        .collect();
    store.put_bools(&entries)
}

impl SettingsStore for Database {
    fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        let conn = self.lock()?;
        let value: Option<String> = match conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [key],
            |row| row.get(0),
        ) {
            Ok(value) => Some(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(StorageError::DatabaseError(e)),
        };

        Ok(match value.as_deref() {
            None => default,
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                tracing::warn!(key, value = other, "malformed settings value, using default");
                default
            }
        })
    }

    fn put_bools(&self, entries: &[(&str, bool)]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                (*key, if *value { "true" } else { "false" }),
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Settings store held in memory.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, bool>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys ever written.
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        let values = self.values.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(values.get(key).copied().unwrap_or(default))
    }

    fn put_bools(&self, entries: &[(&str, bool)]) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::LockPoisoned)?;
        for (key, value) in entries {
            values.insert((*key).to_string(), *value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_never_written() {
        let store = MemorySettingsStore::new();
        assert!(!read_protection_active(&store).unwrap());
        assert_eq!(
            read_platform_settings(&store).unwrap(),
            PlatformSettings::default()
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_platform_settings_roundtrip_in_memory() {
        let store = MemorySettingsStore::new();
        let settings = PlatformSettings::default()
            .with(Platform::Tiktok, false)
            .with(Platform::SnapchatSpotlight, false);

        write_platform_settings(&store, &settings).unwrap();
        assert_eq!(store.len(), 5);
        assert_eq!(read_platform_settings(&store).unwrap(), settings);
    }

    #[test]
    fn test_inconsistent_combination_is_stored() {
        // Nothing here knows about accessibility grants.
        let store = MemorySettingsStore::new();
        write_protection_active(&store, true).unwrap();
        assert!(read_protection_active(&store).unwrap());
    }
}
