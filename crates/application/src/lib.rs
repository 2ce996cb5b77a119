//! Application-side protection state for FocusGuard.
//!
//! The [`ProtectionStore`] is the single owner of UI-visible state. It runs as
//! one tokio task: commands arrive over a bounded channel, block events arrive
//! from the bridge stream, and every change is published as a
//! [`ProtectionSnapshot`] on a `watch` channel.

mod clock;
mod config;
mod constants;
mod error;
mod state;
mod store;

pub use clock::{local_midnight_ms, Clock, FixedClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use constants::*;
pub use error::{Result, StoreError};
pub use state::{Phase, ProtectionSnapshot};
pub use store::{ProtectionStore, StoreHandle, StoreOptions};
