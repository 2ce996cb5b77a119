//! Seams to the OS accessibility subsystem.

/// OS accessibility capability as seen by the bridge.
pub trait AccessibilityProbe: Send + Sync {
    /// Identifiers of all currently enabled accessibility services.
    ///
    /// Implementations return an empty list when the query fails.
    fn enabled_service_ids(&self) -> Vec<String>;

    /// Launch the OS accessibility settings surface.
    fn open_accessibility_settings(&self);
}

/// Notified after the bridge rewrote the shared settings, so the
/// enforcement side re-reads its configuration.
pub trait ReloadSignal: Send + Sync {
    fn reload(&self);
}

/// Reload signal for processes without a connected enforcement service.
pub struct NoReload;

impl ReloadSignal for NoReload {
    fn reload(&self) {}
}
