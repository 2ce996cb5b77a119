//! Target app recognition.
//!
//! Pure lookup on package names, no I/O.

use focusguard_events::Platform;

pub const INSTAGRAM_PACKAGE: &str = "com.instagram.android";
pub const FACEBOOK_PACKAGE: &str = "com.facebook.katana";
pub const SNAPCHAT_PACKAGE: &str = "com.snapchat.android";

/// TikTok package names that do not contain "tiktok".
pub const TIKTOK_PACKAGES: &[&str] = &["com.zhiliaoapp.musically", "com.ss.android.ugc.trill"];

/// Official YouTube and well-known third-party clients.
pub const YOUTUBE_PACKAGES: &[&str] = &[
    "com.google.android.youtube",
    "app.revanced.android.youtube",
    "app.rvx.android.youtube",
    "app.revanced.android.youtube.music",
    "com.vanced.android.youtube",
    "org.schabi.newpipe",
    "dev.libre.tube",
    "free.rm.skytube.oss",
    "free.rm.skytube.extra",
];

/// Substrings identifying other builds of the same clients.
const YOUTUBE_MARKERS: &[&str] = &[
    "revanced",
    "vanced.youtube",
    "newpipe",
    "libretube",
    "skytube",
    "youtube",
];

pub fn is_youtube_app(package: &str) -> bool {
    YOUTUBE_PACKAGES.contains(&package) || YOUTUBE_MARKERS.iter().any(|m| package.contains(m))
}

fn is_tiktok_app(package: &str) -> bool {
    package.contains("tiktok") || TIKTOK_PACKAGES.contains(&package)
}

/// Target platform for a foreground package, if it is monitored at all.
///
/// YouTube clients are checked first.
pub fn platform_for_package(package: &str) -> Option<Platform> {
    if is_youtube_app(package) {
        Some(Platform::YoutubeShorts)
    } else if package == INSTAGRAM_PACKAGE {
        Some(Platform::InstagramReels)
    } else if package == FACEBOOK_PACKAGE {
        Some(Platform::FacebookReels)
    } else if is_tiktok_app(package) {
        Some(Platform::Tiktok)
    } else if package == SNAPCHAT_PACKAGE {
        Some(Platform::SnapchatSpotlight)
    } else {
        None
    }
}

/// Cheap early filter run before any tree inspection.
pub fn is_relevant_app(package: &str) -> bool {
    platform_for_package(package).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_clients() {
        for package in [
            "com.google.android.youtube",
            "app.rvx.android.youtube",
            "org.schabi.newpipe.debug",
            "com.github.libretube",
            "free.rm.skytube.legacy",
            "com.example.youtube.lite",
        ] {
            assert_eq!(
                platform_for_package(package),
                Some(Platform::YoutubeShorts),
                "{package}"
            );
        }
    }

    #[test]
    fn test_other_targets() {
        assert_eq!(
            platform_for_package("com.instagram.android"),
            Some(Platform::InstagramReels)
        );
        assert_eq!(
            platform_for_package("com.facebook.katana"),
            Some(Platform::FacebookReels)
        );
        assert_eq!(
            platform_for_package("com.zhiliaoapp.musically"),
            Some(Platform::Tiktok)
        );
        assert_eq!(
            platform_for_package("com.ss.android.ugc.trill"),
            Some(Platform::Tiktok)
        );
        assert_eq!(
            platform_for_package("com.tiktok.lite"),
            Some(Platform::Tiktok)
        );
        assert_eq!(
            platform_for_package("com.snapchat.android"),
            Some(Platform::SnapchatSpotlight)
        );
    }

    #[test]
    fn test_irrelevant_apps() {
        assert!(!is_relevant_app("com.android.chrome"));
        assert!(!is_relevant_app("com.facebook.orca"));
        assert!(!is_relevant_app(""));
    }
}
