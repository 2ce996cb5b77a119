//! Platform-backed bridge.

use crate::emitter::{BlockEventEmitter, BlockEventStream};
use crate::probe::{AccessibilityProbe, NoReload, ReloadSignal};
use crate::{BlockingBridge, Result};
use async_trait::async_trait;
use focusguard_events::PlatformSettings;
use focusguard_storage::{
    read_platform_settings, read_protection_active, write_platform_settings,
    write_protection_active, SettingsStore,
};
use std::sync::Arc;

/// Bridge backed by the OS accessibility probe and the shared settings store.
pub struct NativeBridge {
    package_id: String,
    probe: Arc<dyn AccessibilityProbe>,
    settings: Arc<dyn SettingsStore>,
    emitter: BlockEventEmitter,
    reload: Arc<dyn ReloadSignal>,
}

impl NativeBridge {
    pub fn new(
        package_id: impl Into<String>,
        probe: Arc<dyn AccessibilityProbe>,
        settings: Arc<dyn SettingsStore>,
        emitter: BlockEventEmitter,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            probe,
            settings,
            emitter,
            reload: Arc::new(NoReload),
        }
    }

    /// Attach the enforcement service that re-reads settings after writes.
    pub fn with_reload(mut self, reload: Arc<dyn ReloadSignal>) -> Self {
        self.reload = reload;
        self
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn emitter(&self) -> &BlockEventEmitter {
        &self.emitter
    }
}

#[async_trait]
impl BlockingBridge for NativeBridge {
    fn is_supported(&self) -> bool {
        true
    }

    async fn is_accessibility_enabled(&self) -> bool {
        let enabled = self
            .probe
            .enabled_service_ids()
            .iter()
            .any(|id| id.contains(&self.package_id));
        tracing::debug!(enabled, "accessibility service status");
        enabled
    }

    async fn open_permission_settings(&self) {
        tracing::info!("opening accessibility settings");
        self.probe.open_accessibility_settings();
    }

    async fn set_protection_active(&self, active: bool) -> Result<bool> {
        write_protection_active(self.settings.as_ref(), active)?;
        self.reload.reload();
        tracing::info!(active, "protection flag written");
        Ok(true)
    }

    async fn is_protection_active(&self) -> Result<bool> {
        Ok(read_protection_active(self.settings.as_ref())?)
    }

    async fn blocked_platforms(&self) -> Result<PlatformSettings> {
        Ok(read_platform_settings(self.settings.as_ref())?)
    }

    async fn set_blocked_platforms(&self, settings: PlatformSettings) -> Result<bool> {
        write_platform_settings(self.settings.as_ref(), &settings)?;
        self.reload.reload();
        tracing::info!(?settings, "platform flags written");
        Ok(true)
    }

    fn subscribe(&self, capacity: usize) -> BlockEventStream {
        self.emitter.listen(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusguard_events::{BlockEvent, Platform};
    use focusguard_storage::MemorySettingsStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProbe {
        services: Vec<String>,
        opened: AtomicUsize,
    }

    impl AccessibilityProbe for FakeProbe {
        fn enabled_service_ids(&self) -> Vec<String> {
            self.services.clone()
        }

        fn open_accessibility_settings(&self) {
            self.opened.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingReload(AtomicUsize);

    impl ReloadSignal for CountingReload {
        fn reload(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn bridge_with(services: &[&str]) -> (NativeBridge, Arc<FakeProbe>, Arc<CountingReload>) {
        let probe = Arc::new(FakeProbe {
            services: services.iter().map(|s| s.to_string()).collect(),
            opened: AtomicUsize::new(0),
        });
        let reload = Arc::new(CountingReload::default());
        let bridge = NativeBridge::new(
            "com.focusguard",
            probe.clone(),
            Arc::new(MemorySettingsStore::new()),
            BlockEventEmitter::new(),
        )
        .with_reload(reload.clone());
        (bridge, probe, reload)
    }

    #[tokio::test]
    async fn test_accessibility_enabled_matches_own_service() {
        let (bridge, _, _) = bridge_with(&[
            "com.other.app/.Service",
            "com.focusguard/.BlockingAccessibilityService",
        ]);
        assert!(bridge.is_accessibility_enabled().await);

        let (bridge, _, _) = bridge_with(&["com.other.app/.Service"]);
        assert!(!bridge.is_accessibility_enabled().await);

        let (bridge, _, _) = bridge_with(&[]);
        assert!(!bridge.is_accessibility_enabled().await);
    }

    #[tokio::test]
    async fn test_open_settings_forwards_to_probe() {
        let (bridge, probe, _) = bridge_with(&[]);
        bridge.open_permission_settings().await;
        assert_eq!(probe.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_defaults_from_fresh_store() {
        let (bridge, _, _) = bridge_with(&[]);
        assert!(!bridge.is_protection_active().await.unwrap());
        assert_eq!(
            bridge.blocked_platforms().await.unwrap(),
            PlatformSettings::default()
        );
    }

    #[tokio::test]
    async fn test_writes_persist_and_signal_reload() {
        let (bridge, _, reload) = bridge_with(&[]);

        assert!(bridge.set_protection_active(true).await.unwrap());
        assert!(bridge.is_protection_active().await.unwrap());

        let settings = PlatformSettings::default().with(Platform::Tiktok, false);
        assert!(bridge.set_blocked_platforms(settings).await.unwrap());
        assert_eq!(bridge.blocked_platforms().await.unwrap(), settings);

        assert_eq!(reload.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_subscribe_receives_emitted_events() {
        let (bridge, _, _) = bridge_with(&[]);
        let mut stream = bridge.subscribe(4);

        bridge.emitter().emit(BlockEvent::new("TikTok", 7));
        assert_eq!(stream.recv().await, Some(BlockEvent::new("TikTok", 7)));
    }
}
