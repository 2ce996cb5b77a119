//! Stand-ins for the OS accessibility surfaces when running headless.

use focusguard_bridge::AccessibilityProbe;
use focusguard_detect::{BlockNotice, ContentDismisser};
use focusguard_storage::{SettingsStore, StorageError};
use std::sync::Arc;

/// Settings key holding the simulated accessibility grant.
pub const KEY_ACCESSIBILITY_ENABLED: &str = "cli.accessibility_enabled";

/// Accessibility probe whose grant lives in the settings store.
pub struct SimulatedProbe {
    package_id: String,
    settings: Arc<dyn SettingsStore>,
}

impl SimulatedProbe {
    pub fn new(package_id: impl Into<String>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            package_id: package_id.into(),
            settings,
        }
    }

    pub fn set_granted(&self, granted: bool) -> Result<(), StorageError> {
        self.settings
            .put_bools(&[(KEY_ACCESSIBILITY_ENABLED, granted)])
    }

    fn service_id(&self) -> String {
        format!("{}/.blocking.ContentBlockerService", self.package_id)
    }
}

impl AccessibilityProbe for SimulatedProbe {
    fn enabled_service_ids(&self) -> Vec<String> {
        match self.settings.get_bool(KEY_ACCESSIBILITY_ENABLED, false) {
            Ok(true) => vec![self.service_id()],
            Ok(false) => Vec::new(),
            Err(e) => {
                tracing::warn!("failed to read simulated accessibility grant: {e}");
                Vec::new()
            }
        }
    }

    fn open_accessibility_settings(&self) {
        println!("Accessibility permission required: run `focusguard grant` to enable the service.");
    }
}

/// Prints the overlay and navigation steps to stdout.
pub struct ConsoleDismisser;

impl ContentDismisser for ConsoleDismisser {
    fn show_overlay(&self, notice: &BlockNotice) {
        println!(
            "[overlay] {} blocked ({}): {}",
            notice.platform,
            notice.category.label(),
            notice.message
        );
    }

    fn hide_overlay(&self) {
        println!("[overlay] hidden");
    }

    fn navigate_back(&self) {
        println!("[navigation] back");
    }
}
