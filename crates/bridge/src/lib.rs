//! Native bridge between the application store and the enforcement side.
//!
//! The bridge exposes a synchronous-looking command surface (permission,
//! protection flag, platform flags) and one asynchronous event stream of
//! block events.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  BlockingBridge (trait)                                      │
//! │    NativeBridge - probe + settings store + event emitter     │
//! │    NullBridge   - capability absent, safe defaults           │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  channel.rs - method-call codec and dispatch                 │
//! │  emitter.rs - single-listener bounded event stream           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The implementation is chosen once at startup with [`select_bridge`].

pub mod channel;
mod emitter;
mod native;
mod null;
mod probe;

pub use emitter::{BlockEventEmitter, BlockEventStream, DEFAULT_EVENT_CAPACITY};
pub use native::NativeBridge;
pub use null::NullBridge;
pub use probe::{AccessibilityProbe, NoReload, ReloadSignal};

use async_trait::async_trait;
use focusguard_events::PlatformSettings;
use focusguard_storage::StorageError;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("settings store error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Command and event surface of the enforcement capability.
#[async_trait]
pub trait BlockingBridge: Send + Sync {
    /// Whether this bridge is backed by a real enforcement capability.
    fn is_supported(&self) -> bool;

    /// True iff the app's accessibility service is currently enabled.
    ///
    /// Never fails: a missing capability or probe failure reads as `false`.
    async fn is_accessibility_enabled(&self) -> bool;

    /// Navigate to the OS accessibility settings. Fire-and-forget.
    async fn open_permission_settings(&self);

    /// Persist the protection flag and tell the probe to reload.
    async fn set_protection_active(&self, active: bool) -> Result<bool>;

    async fn is_protection_active(&self) -> Result<bool>;

    /// Current per-platform flags as stored for the probe.
    async fn blocked_platforms(&self) -> Result<PlatformSettings>;

    /// Persist all five platform flags in one batch and tell the probe to reload.
    async fn set_blocked_platforms(&self, settings: PlatformSettings) -> Result<bool>;

    /// Register the event listener, replacing any previous one.
    fn subscribe(&self, capacity: usize) -> BlockEventStream;
}

/// Type alias for a shared bridge reference.
pub type BridgeRef = Arc<dyn BlockingBridge>;

/// Pick the bridge implementation for this process.
///
/// `native` is `Some` only where the enforcement capability exists. The choice
/// is made here once; callers never branch on the platform afterwards.
pub fn select_bridge(native: Option<NativeBridge>) -> BridgeRef {
    match native {
        Some(bridge) => {
            tracing::info!(package_id = bridge.package_id(), "using native blocking bridge");
            Arc::new(bridge)
        }
        None => {
            tracing::info!("enforcement capability absent, using null bridge");
            Arc::new(NullBridge)
        }
    }
}
