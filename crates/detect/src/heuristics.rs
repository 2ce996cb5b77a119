//! Per-platform content checks.
//!
//! Every check looks for the short-form *player or feed being in front*, not
//! merely for a navigation entry with the same name.

use crate::node::{ContentNode, Screen};
use focusguard_events::Platform;

/// Why a tree was classified as short-form content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The platform's short-form tab is selected.
    SelectedTab,
    /// Player-specific buttons ("Like this Short").
    PlayerButtons,
    /// Like button stacked on the right edge, as in vertical players.
    LikeOnRight,
    /// Like/Dislike/Share/Comment present, long-form controls absent.
    ButtonPattern,
    /// Reels header next to a camera shortcut.
    ReelsHeader,
    /// TikTok feed label.
    FeedLabel,
}

/// Fraction of the screen width left of which a Like button is "normal".
const RIGHT_EDGE_FRACTION: f64 = 0.65;

/// Fraction of the screen height above which a Like button is ignored.
const TOP_FRACTION: f64 = 0.25;

/// Controls only long-form players show.
const LONG_FORM_CONTROLS: &[&str] = &["Download", "Clip", "Save", "Thanks"];

/// Classify `root` for `platform`.
pub fn detect(platform: Platform, root: &ContentNode, fallback: Screen) -> Option<Signal> {
    match platform {
        Platform::YoutubeShorts => shorts(root, fallback),
        Platform::InstagramReels | Platform::FacebookReels => reels(root, fallback),
        Platform::Tiktok => for_you_feed(root),
        Platform::SnapchatSpotlight => root
            .has_selected_tab("Spotlight")
            .then_some(Signal::SelectedTab),
    }
}

fn like_on_right(root: &ContentNode, screen: Screen) -> Option<&ContentNode> {
    let like = root.find("Like")?;
    (f64::from(like.bounds.left) > f64::from(screen.width) * RIGHT_EDGE_FRACTION).then_some(like)
}

fn shorts(root: &ContentNode, fallback: Screen) -> Option<Signal> {
    if root.has_selected_tab("Shorts") {
        return Some(Signal::SelectedTab);
    }

    if root.contains("Like this Short") || root.contains("Dislike this Short") {
        return Some(Signal::PlayerButtons);
    }

    let screen = root.screen(fallback);
    if let Some(like) = like_on_right(root, screen) {
        if f64::from(like.bounds.top) > f64::from(screen.height) * TOP_FRACTION {
            return Some(Signal::LikeOnRight);
        }
    }

    let engagement = ["Like", "Dislike", "Share", "Comment"]
        .iter()
        .all(|k| root.contains(k));
    let long_form = LONG_FORM_CONTROLS.iter().any(|k| root.contains(k));
    if engagement && !long_form {
        tracing::debug!(search = root.contains("Search"), "shorts button pattern");
        return Some(Signal::ButtonPattern);
    }

    None
}

fn reels(root: &ContentNode, fallback: Screen) -> Option<Signal> {
    if root.has_selected_tab("Reels") {
        return Some(Signal::SelectedTab);
    }

    if root.contains("Reels") && root.contains("Camera") {
        return Some(Signal::ReelsHeader);
    }

    // Stories also put Like on the right but use a reply field, not a Comment button.
    let screen = root.screen(fallback);
    if like_on_right(root, screen).is_some() && root.contains("Comment") {
        return Some(Signal::LikeOnRight);
    }

    None
}

fn for_you_feed(root: &ContentNode) -> Option<Signal> {
    (root.contains("For You") || root.contains("Following")).then_some(Signal::FeedLabel)
}
