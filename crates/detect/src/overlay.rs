//! Block overlay and dismissal.
//!
//! On a block the user sees a full-screen notice for a short while, then the
//! offending screen is left with two "back" navigations.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tone of the notice shown on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeCategory {
    Firm,
    Friendly,
    Motivational,
}

impl NoticeCategory {
    const ALL: [NoticeCategory; 3] = [
        NoticeCategory::Firm,
        NoticeCategory::Friendly,
        NoticeCategory::Motivational,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NoticeCategory::Firm => "🛡️ Protection Active",
            NoticeCategory::Friendly => "👋 Friendly Reminder",
            NoticeCategory::Motivational => "💪 Stay Motivated",
        }
    }

    fn messages(&self) -> &'static [&'static str] {
        match self {
            NoticeCategory::Firm => &[
                "Focus! No scrolling right now.",
                "FocusGuard activated: Stay on task.",
                "Access denied. Your goals come first.",
                "Not today. Stay disciplined.",
                "Distractions blocked. Keep going!",
            ],
            NoticeCategory::Friendly => &[
                "Hey there! Let's give your brain a break.",
                "Oops! You hit the distraction wall.",
                "Whoa! Almost got you there. 😊",
                "Nice try! But let's stay focused.",
                "Caught ya! Back to what matters.",
            ],
            NoticeCategory::Motivational => &[
                "Your time is precious. Protect it!",
                "Keep your focus sharp. FocusGuard says no.",
                "Champions don't get distracted. Be one!",
                "Every second counts. Use it wisely!",
                "Your future self will thank you.",
                "Greatness requires focus. You've got this!",
            ],
        }
    }
}

/// What the overlay shows for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockNotice {
    pub platform: String,
    pub category: NoticeCategory,
    pub message: &'static str,
}

impl BlockNotice {
    /// Pick a notice. Equal seeds give equal notices.
    pub fn pick(platform: impl Into<String>, seed: u64) -> Self {
        let category = NoticeCategory::ALL[(seed % 3) as usize];
        let messages = category.messages();
        let message = messages[((seed / 3) % messages.len() as u64) as usize];
        Self {
            platform: platform.into(),
            category,
            message,
        }
    }
}

/// OS surface that draws the overlay and navigates away.
pub trait ContentDismisser: Send + Sync {
    fn show_overlay(&self, notice: &BlockNotice);
    fn hide_overlay(&self);
    /// Global "back" navigation.
    fn navigate_back(&self);
}

/// Dismisser that only logs, for headless runs.
pub struct NullDismisser;

impl ContentDismisser for NullDismisser {
    fn show_overlay(&self, notice: &BlockNotice) {
        tracing::info!(platform = %notice.platform, message = %notice.message, "block overlay");
    }

    fn hide_overlay(&self) {}

    fn navigate_back(&self) {}
}

/// Overlay lifetime and back-navigation spacing.
#[derive(Debug, Clone, Copy)]
pub struct OverlayTiming {
    pub display: Duration,
    pub back_repeat: Duration,
}

impl Default for OverlayTiming {
    fn default() -> Self {
        Self {
            display: Duration::from_millis(2000),
            back_repeat: Duration::from_millis(300),
        }
    }
}

/// Shows at most one overlay at a time and schedules its dismissal.
#[derive(Clone)]
pub struct OverlayController {
    dismisser: Arc<dyn ContentDismisser>,
    shown: Arc<AtomicBool>,
    timing: OverlayTiming,
}

impl OverlayController {
    pub fn new(dismisser: Arc<dyn ContentDismisser>, timing: OverlayTiming) -> Self {
        Self {
            dismisser,
            shown: Arc::new(AtomicBool::new(false)),
            timing,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }

    /// Show `notice` unless an overlay is already up.
    ///
    /// Returns false if the call was ignored.
    pub fn present(&self, notice: BlockNotice) -> bool {
        if self.shown.swap(true, Ordering::SeqCst) {
            tracing::debug!(platform = %notice.platform, "overlay already shown");
            return false;
        }

        self.dismisser.show_overlay(&notice);
        tracing::info!(platform = %notice.platform, "overlay shown");

        let dismisser = Arc::clone(&self.dismisser);
        let shown = Arc::clone(&self.shown);
        let timing = self.timing;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(timing.display).await;
                    dismiss(dismisser.as_ref(), &shown);
                    tokio::time::sleep(timing.back_repeat).await;
                    dismisser.navigate_back();
                });
            }
            Err(_) => {
                tracing::warn!("no async runtime, dismissing overlay immediately");
                dismiss(dismisser.as_ref(), &shown);
                dismisser.navigate_back();
            }
        }
        true
    }
}

fn dismiss(dismisser: &dyn ContentDismisser, shown: &AtomicBool) {
    dismisser.hide_overlay();
    shown.store(false, Ordering::SeqCst);
    tracing::info!("overlay hidden");
    dismisser.navigate_back();
}
