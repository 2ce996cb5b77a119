//! Enforcement service wired to a native bridge over one SQLite database.

use focusguard_bridge::{AccessibilityProbe, BlockEventEmitter, BlockingBridge, NativeBridge};
use focusguard_detect::{
    BlockNotice, ContentDismisser, ContentNode, EnforcementService, OverlayTiming, ServiceOptions,
};
use focusguard_events::{BlockEvent, Platform, PlatformSettings};
use focusguard_storage::Database;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct GrantedProbe;

impl AccessibilityProbe for GrantedProbe {
    fn enabled_service_ids(&self) -> Vec<String> {
        vec!["com.focusguard/.BlockingAccessibilityService".to_string()]
    }

    fn open_accessibility_settings(&self) {}
}

#[derive(Default)]
struct RecordingDismisser {
    actions: Mutex<Vec<String>>,
}

impl RecordingDismisser {
    fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }
}

impl ContentDismisser for RecordingDismisser {
    fn show_overlay(&self, notice: &BlockNotice) {
        self.actions
            .lock()
            .unwrap()
            .push(format!("show:{}", notice.platform));
    }

    fn hide_overlay(&self) {
        self.actions.lock().unwrap().push("hide".to_string());
    }

    fn navigate_back(&self) {
        self.actions.lock().unwrap().push("back".to_string());
    }
}

struct Fixture {
    bridge: NativeBridge,
    service: Arc<EnforcementService>,
    dismisser: Arc<RecordingDismisser>,
    emitter: BlockEventEmitter,
}

fn fixture() -> Fixture {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let emitter = BlockEventEmitter::new();
    let dismisser = Arc::new(RecordingDismisser::default());
    let service = EnforcementService::connect(
        db.clone(),
        emitter.clone(),
        dismisser.clone(),
        ServiceOptions {
            overlay: OverlayTiming {
                display: Duration::from_millis(2000),
                back_repeat: Duration::from_millis(300),
            },
            ..ServiceOptions::default()
        },
    );
    let bridge = NativeBridge::new("com.focusguard", Arc::new(GrantedProbe), db, emitter.clone())
        .with_reload(service.clone());
    Fixture {
        bridge,
        service,
        dismisser,
        emitter,
    }
}

fn reels_tree() -> ContentNode {
    serde_json::from_value(serde_json::json!({
        "bounds": { "left": 0, "top": 0, "right": 1080, "bottom": 2400 },
        "children": [
            { "text": "Home" },
            { "contentDescription": "Reels", "selected": true },
            { "text": "Profile" }
        ]
    }))
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_bridge_writes_arm_the_service() {
    let f = fixture();
    let mut stream = f.bridge.subscribe(8);
    let tree = reels_tree();

    assert!(f
        .service
        .on_content_changed("com.instagram.android", Some(&tree), 1_000)
        .is_none());

    f.bridge.set_protection_active(true).await.unwrap();
    assert!(f.service.config().protection_active);

    let event = f
        .service
        .on_content_changed("com.instagram.android", Some(&tree), 2_000)
        .unwrap();
    assert_eq!(event, BlockEvent::new("Instagram Reels", 2_000));
    assert_eq!(stream.recv().await, Some(event));
    assert!(f.service.overlay().is_shown());

    tokio::time::sleep(Duration::from_millis(2_400)).await;
    assert_eq!(
        f.dismisser.actions(),
        vec!["show:Instagram Reels", "hide", "back", "back"]
    );
    assert!(!f.service.overlay().is_shown());
}

#[tokio::test(start_paused = true)]
async fn test_platform_flags_reach_the_service() {
    let f = fixture();
    f.bridge.set_protection_active(true).await.unwrap();
    f.bridge
        .set_blocked_platforms(PlatformSettings::default().with(Platform::InstagramReels, false))
        .await
        .unwrap();

    let tree = reels_tree();
    assert!(f
        .service
        .on_content_changed("com.instagram.android", Some(&tree), 1_000)
        .is_none());
    assert!(f
        .service
        .on_content_changed("com.facebook.katana", Some(&tree), 2_000)
        .is_some());
}

#[tokio::test(start_paused = true)]
async fn test_overlay_is_not_stacked() {
    let f = fixture();
    f.bridge.set_protection_active(true).await.unwrap();
    let tree = reels_tree();

    assert!(f
        .service
        .on_content_changed("com.instagram.android", Some(&tree), 1_000)
        .is_some());
    assert!(f
        .service
        .on_content_changed("com.instagram.android", Some(&tree), 1_600)
        .is_some());

    tokio::time::sleep(Duration::from_millis(3_000)).await;
    let shows = f
        .dismisser
        .actions()
        .iter()
        .filter(|a| a.starts_with("show:"))
        .count();
    assert_eq!(shows, 1);
}

#[tokio::test]
async fn test_no_listener_still_blocks() {
    let f = fixture();
    f.bridge.set_protection_active(true).await.unwrap();
    assert!(!f.emitter.has_listener());

    let tree = reels_tree();
    assert!(f
        .service
        .on_content_changed("com.instagram.android", Some(&tree), 1_000)
        .is_some());
}
