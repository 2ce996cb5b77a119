use focusguard_events::{BlockEvent, PlatformSettings};
use serde::Serialize;

/// Store lifecycle. Only `Ready` serves commands other than hydrate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Uninitialized,
    Hydrating,
    Ready,
}

/// UI-visible protection state, as published by the store.
///
/// Before `Ready` this holds defaults: inactive, no permission, every
/// platform enabled, no activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionSnapshot {
    pub phase: Phase,
    pub active: bool,
    pub has_permission: bool,
    pub platform_settings: PlatformSettings,
    pub blocked_today: u64,
    /// Newest first.
    pub recent_activity: Vec<BlockEvent>,
}

impl ProtectionSnapshot {
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Prepend `event` to the activity list, keeping at most `capacity`.
    pub(crate) fn push_recent(&mut self, event: BlockEvent, capacity: usize) {
        self.recent_activity.insert(0, event);
        self.recent_activity.truncate(capacity);
    }
}
