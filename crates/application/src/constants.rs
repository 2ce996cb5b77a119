/// Entries kept in the in-memory recent activity list.
pub const HISTORY_CAPACITY: usize = 10;

/// Pending commands before callers wait on the store.
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Buffered block events between the bridge and the store.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

pub const DEFAULT_PACKAGE_ID: &str = "com.focusguard";

pub const DEFAULT_LOG_FILTER: &str = "info,focusguard=debug";

/// Overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "FOCUSGUARD_CONFIG";

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
