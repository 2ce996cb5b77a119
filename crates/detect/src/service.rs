//! Enforcement service: the long-lived half of the probe.

use crate::apps::platform_for_package;
use crate::heuristics::detect;
use crate::node::{ContentNode, Screen};
use crate::overlay::{BlockNotice, ContentDismisser, OverlayController, OverlayTiming};
use focusguard_bridge::{BlockEventEmitter, ReloadSignal};
use focusguard_events::{BlockEvent, Platform, PlatformSettings};
use focusguard_storage::{read_platform_settings, read_protection_active, SettingsStore};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Minimum spacing between two tree inspections.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// What the service enforces, as last read from the settings store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnforcementConfig {
    pub protection_active: bool,
    pub platforms: PlatformSettings,
}

#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    pub check_interval: Duration,
    pub fallback_screen: Screen,
    pub overlay: OverlayTiming,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            fallback_screen: Screen::default(),
            overlay: OverlayTiming::default(),
        }
    }
}

#[derive(Default)]
struct ServiceState {
    config: EnforcementConfig,
    last_check_ms: Option<i64>,
}

pub struct EnforcementService {
    settings: Arc<dyn SettingsStore>,
    emitter: BlockEventEmitter,
    overlay: OverlayController,
    options: ServiceOptions,
    state: Mutex<ServiceState>,
}

impl EnforcementService {
    /// Create the service and load its configuration.
    pub fn connect(
        settings: Arc<dyn SettingsStore>,
        emitter: BlockEventEmitter,
        dismisser: Arc<dyn ContentDismisser>,
        options: ServiceOptions,
    ) -> Arc<Self> {
        let service = Arc::new(Self {
            settings,
            emitter,
            overlay: OverlayController::new(dismisser, options.overlay),
            options,
            state: Mutex::new(ServiceState::default()),
        });
        tracing::info!("enforcement service connected");
        service.load_preferences();
        service
    }

    fn state(&self) -> MutexGuard<'_, ServiceState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Re-read the shared settings. On failure the previous config stays.
    pub fn load_preferences(&self) {
        let loaded = read_protection_active(self.settings.as_ref()).and_then(|active| {
            Ok(EnforcementConfig {
                protection_active: active,
                platforms: read_platform_settings(self.settings.as_ref())?,
            })
        });

        match loaded {
            Ok(config) => {
                tracing::info!(
                    protection_active = config.protection_active,
                    youtube_shorts = config.platforms.youtube_shorts,
                    instagram_reels = config.platforms.instagram_reels,
                    facebook_reels = config.platforms.facebook_reels,
                    tiktok = config.platforms.tiktok,
                    snapchat_spotlight = config.platforms.snapchat_spotlight,
                    "enforcement config loaded"
                );
                self.state().config = config;
            }
            Err(e) => tracing::error!("failed to load enforcement config: {e}"),
        }
    }

    pub fn config(&self) -> EnforcementConfig {
        self.state().config
    }

    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    /// Handle one content-changed/scrolled notification.
    ///
    /// Returns the block event if the content was blocked.
    pub fn on_content_changed(
        &self,
        package: &str,
        root: Option<&ContentNode>,
        now_ms: i64,
    ) -> Option<BlockEvent> {
        let platform = platform_for_package(package)?;

        let config = {
            let mut state = self.state();
            if !state.config.protection_active {
                tracing::trace!(package, "protection inactive, skipping");
                return None;
            }

            let interval = self.options.check_interval.as_millis() as i64;
            if let Some(last) = state.last_check_ms {
                if now_ms - last < interval {
                    return None;
                }
            }
            state.last_check_ms = Some(now_ms);
            state.config
        };

        let Some(root) = root else {
            tracing::warn!(package, "no content tree for package");
            return None;
        };

        if !config.platforms.get(platform) {
            return None;
        }

        let signal = detect(platform, root, self.options.fallback_screen)?;
        tracing::info!(%platform, ?signal, package, "short-form content detected");
        Some(self.block(platform, now_ms))
    }

    fn block(&self, platform: Platform, now_ms: i64) -> BlockEvent {
        self.overlay
            .present(BlockNotice::pick(platform.label(), now_ms.unsigned_abs()));

        let event = BlockEvent::new(platform.label(), now_ms);
        if !self.emitter.emit(event.clone()) {
            tracing::debug!(%platform, "block event not delivered");
        }
        event
    }
}

impl ReloadSignal for EnforcementService {
    fn reload(&self) {
        self.load_preferences();
        tracing::info!("enforcement config reloaded");
    }
}
