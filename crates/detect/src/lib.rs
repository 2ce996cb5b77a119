//! Enforcement probe for FocusGuard.
//!
//! Runs on the enforcement side: receives foreground content snapshots from
//! the OS accessibility layer, recognises short-form video surfaces, dismisses
//! them and reports a block event over the bridge.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  apps.rs       - package name → target platform (pure)      │
//! │  node.rs       - content tree snapshot and search (pure)    │
//! │  heuristics.rs - per-platform content checks (pure)         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  overlay.rs - block notice, overlay timing, back navigation │
//! │  service.rs - settings reload, throttling, event emission   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod apps;
mod heuristics;
mod node;
mod overlay;
mod service;

pub use apps::{
    is_relevant_app, is_youtube_app, platform_for_package, FACEBOOK_PACKAGE, INSTAGRAM_PACKAGE,
    SNAPCHAT_PACKAGE, TIKTOK_PACKAGES, YOUTUBE_PACKAGES,
};
pub use heuristics::{detect, Signal};
pub use node::{ContentNode, Rect, Screen};
pub use overlay::{
    BlockNotice, ContentDismisser, NoticeCategory, NullDismisser, OverlayController,
    OverlayTiming,
};
pub use service::{EnforcementConfig, EnforcementService, ServiceOptions, DEFAULT_CHECK_INTERVAL};
