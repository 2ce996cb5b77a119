//! Shared contracts between the enforcement side and the application store.
//!
//! Everything that crosses the bridge (block events, platform flags) is defined
//! here once, so the probe, the bridge codec and the store agree on field names.
//!
//! Also provides the `EventBus` trait used to notify UI observers.

mod bus;

pub use bus::{EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emitted when a toggle was redirected to the permission settings.
pub const TOPIC_PERMISSION_REQUIRED: &str = "protection:permission_required";

/// Emitted after a block event has been recorded.
pub const TOPIC_CONTENT_BLOCKED: &str = "protection:content_blocked";

/// Emitted whenever the published protection state changes.
pub const TOPIC_STATE: &str = "protection:state";

/// A short-form video surface that can be blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    YoutubeShorts,
    InstagramReels,
    FacebookReels,
    Tiktok,
    SnapchatSpotlight,
}

impl Platform {
    /// All platforms in settings order.
    pub const ALL: [Platform; 5] = [
        Platform::YoutubeShorts,
        Platform::InstagramReels,
        Platform::FacebookReels,
        Platform::Tiktok,
        Platform::SnapchatSpotlight,
    ];

    /// Label carried in block events and shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::YoutubeShorts => "YouTube Shorts",
            Platform::InstagramReels => "Instagram Reels",
            Platform::FacebookReels => "Facebook Reels",
            Platform::Tiktok => "TikTok",
            Platform::SnapchatSpotlight => "Snapchat Spotlight",
        }
    }

    /// Short identifier used on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Platform::YoutubeShorts => "youtube-shorts",
            Platform::InstagramReels => "instagram-reels",
            Platform::FacebookReels => "facebook-reels",
            Platform::Tiktok => "tiktok",
            Platform::SnapchatSpotlight => "snapchat-spotlight",
        }
    }

    /// Map a block event label back to a platform.
    ///
    /// Block events carry raw strings; unknown labels return `None` and are
    /// kept verbatim by callers.
    pub fn from_label(label: &str) -> Option<Platform> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error returned when parsing an unknown platform name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform: {}", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| {
                p.slug().eq_ignore_ascii_case(needle) || p.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// Per-platform enable flags. Every flag defaults to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    pub youtube_shorts: bool,
    pub instagram_reels: bool,
    pub facebook_reels: bool,
    pub tiktok: bool,
    pub snapchat_spotlight: bool,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            youtube_shorts: true,
            instagram_reels: true,
            facebook_reels: true,
            tiktok: true,
            snapchat_spotlight: true,
        }
    }
}

impl PlatformSettings {
    pub fn get(&self, platform: Platform) -> bool {
        match platform {
            Platform::YoutubeShorts => self.youtube_shorts,
            Platform::InstagramReels => self.instagram_reels,
            Platform::FacebookReels => self.facebook_reels,
            Platform::Tiktok => self.tiktok,
            Platform::SnapchatSpotlight => self.snapchat_spotlight,
        }
    }

    pub fn set(&mut self, platform: Platform, enabled: bool) {
        let flag = match platform {
            Platform::YoutubeShorts => &mut self.youtube_shorts,
            Platform::InstagramReels => &mut self.instagram_reels,
            Platform::FacebookReels => &mut self.facebook_reels,
            Platform::Tiktok => &mut self.tiktok,
            Platform::SnapchatSpotlight => &mut self.snapchat_spotlight,
        };
        *flag = enabled;
    }

    /// Copy with one flag changed.
    pub fn with(mut self, platform: Platform, enabled: bool) -> Self {
        self.set(platform, enabled);
        self
    }

    /// Platforms currently enabled, in settings order.
    pub fn enabled(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.get(*p))
            .collect()
    }
}

/// A single detected-and-dismissed piece of content.
///
/// Payload of the `onContentBlocked` event: `{"platform": ..., "timestamp": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEvent {
    /// Raw platform label as reported by the probe.
    pub platform: String,
    /// Detection time in milliseconds since epoch.
    pub timestamp: i64,
}

impl BlockEvent {
    pub fn new(platform: impl Into<String>, timestamp: i64) -> Self {
        Self {
            platform: platform.into(),
            timestamp,
        }
    }

    pub fn platform_kind(&self) -> Option<Platform> {
        Platform::from_label(&self.platform)
    }
}
