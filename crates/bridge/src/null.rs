//! Bridge for platforms without the enforcement capability.

use crate::emitter::BlockEventStream;
use crate::{BlockingBridge, Result};
use async_trait::async_trait;
use focusguard_events::PlatformSettings;

/// Every read returns a safe default and every write is a no-op returning `false`.
pub struct NullBridge;

#[async_trait]
impl BlockingBridge for NullBridge {
    fn is_supported(&self) -> bool {
        false
    }

    async fn is_accessibility_enabled(&self) -> bool {
        false
    }

    async fn open_permission_settings(&self) {}

    async fn set_protection_active(&self, _active: bool) -> Result<bool> {
        Ok(false)
    }

    async fn is_protection_active(&self) -> Result<bool> {
        Ok(false)
    }

    async fn blocked_platforms(&self) -> Result<PlatformSettings> {
        Ok(PlatformSettings::default())
    }

    async fn set_blocked_platforms(&self, _settings: PlatformSettings) -> Result<bool> {
        Ok(false)
    }

    fn subscribe(&self, _capacity: usize) -> BlockEventStream {
        BlockEventStream::closed()
    }
}
