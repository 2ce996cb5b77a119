//! End-to-end method-channel tests over a SQLite-backed native bridge.

use focusguard_bridge::channel::{
    dispatch, MethodCall, MethodResponse, METHOD_IS_ACCESSIBILITY_ENABLED,
    METHOD_IS_PROTECTION_ACTIVE, METHOD_OPEN_ACCESSIBILITY_SETTINGS,
    METHOD_SET_BLOCKED_PLATFORMS, METHOD_SET_PROTECTION_ACTIVE,
};
use focusguard_bridge::{
    select_bridge, AccessibilityProbe, BlockEventEmitter, BlockingBridge, NativeBridge,
};
use focusguard_events::{BlockEvent, Platform};
use focusguard_storage::{read_platform_settings, read_protection_active, Database};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct ToggleProbe {
    enabled: AtomicBool,
    opened: AtomicUsize,
}

impl AccessibilityProbe for ToggleProbe {
    fn enabled_service_ids(&self) -> Vec<String> {
        if self.enabled.load(Ordering::SeqCst) {
            vec!["com.focusguard/.BlockingAccessibilityService".to_string()]
        } else {
            Vec::new()
        }
    }

    fn open_accessibility_settings(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }
}

struct Fixture {
    bridge: Arc<dyn BlockingBridge>,
    probe: Arc<ToggleProbe>,
    db: Arc<Database>,
    emitter: BlockEventEmitter,
}

fn fixture() -> Fixture {
    let probe = Arc::new(ToggleProbe::default());
    let db = Arc::new(Database::open_in_memory().unwrap());
    let emitter = BlockEventEmitter::new();
    let native = NativeBridge::new("com.focusguard", probe.clone(), db.clone(), emitter.clone());
    Fixture {
        bridge: select_bridge(Some(native)),
        probe,
        db,
        emitter,
    }
}

async fn call(fixture: &Fixture, method: &str, arguments: Value) -> MethodResponse {
    dispatch(fixture.bridge.as_ref(), &MethodCall::new(method, arguments)).await
}

#[tokio::test]
async fn test_default_store_reads() {
    let f = fixture();
    assert_eq!(
        call(&f, METHOD_IS_PROTECTION_ACTIVE, Value::Null).await,
        MethodResponse::Success { value: json!(false) }
    );
    assert!(read_platform_settings(f.db.as_ref())
        .unwrap()
        .enabled()
        .len()
        == 5);
}

#[tokio::test]
async fn test_permission_follows_probe() {
    let f = fixture();
    assert_eq!(
        call(&f, METHOD_IS_ACCESSIBILITY_ENABLED, Value::Null).await,
        MethodResponse::Success { value: json!(false) }
    );

    f.probe.enabled.store(true, Ordering::SeqCst);
    assert_eq!(
        call(&f, METHOD_IS_ACCESSIBILITY_ENABLED, Value::Null).await,
        MethodResponse::Success { value: json!(true) }
    );
}

#[tokio::test]
async fn test_open_settings_returns_null() {
    let f = fixture();
    assert_eq!(
        call(&f, METHOD_OPEN_ACCESSIBILITY_SETTINGS, Value::Null).await,
        MethodResponse::Success { value: Value::Null }
    );
    assert_eq!(f.probe.opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_set_protection_active_persists() {
    let f = fixture();
    assert_eq!(
        call(&f, METHOD_SET_PROTECTION_ACTIVE, json!({"active": true})).await,
        MethodResponse::Success { value: json!(true) }
    );
    assert!(read_protection_active(f.db.as_ref()).unwrap());
    assert_eq!(
        call(&f, METHOD_IS_PROTECTION_ACTIVE, Value::Null).await,
        MethodResponse::Success { value: json!(true) }
    );
}

#[tokio::test]
async fn test_set_blocked_platforms_persists_all_five() {
    let f = fixture();
    let args = json!({
        "youtube": false,
        "instagram": true,
        "facebook": false,
        "tiktok": true,
        "snapchat": false,
    });
    assert_eq!(
        call(&f, METHOD_SET_BLOCKED_PLATFORMS, args).await,
        MethodResponse::Success { value: json!(true) }
    );

    let stored = read_platform_settings(f.db.as_ref()).unwrap();
    assert_eq!(
        stored.enabled(),
        vec![Platform::InstagramReels, Platform::Tiktok]
    );
}

#[tokio::test]
async fn test_event_surface_single_listener() {
    let f = fixture();
    let mut first = f.bridge.subscribe(4);
    let mut second = f.bridge.subscribe(4);

    assert!(f.emitter.emit(BlockEvent::new("TikTok", 5)));
    assert!(first.recv().await.is_none());
    assert_eq!(second.recv().await, Some(BlockEvent::new("TikTok", 5)));
}

#[tokio::test]
async fn test_capability_absent_selects_null_bridge() {
    let bridge = select_bridge(None);
    assert!(!bridge.is_supported());
    let response = dispatch(
        bridge.as_ref(),
        &MethodCall::new(METHOD_IS_ACCESSIBILITY_ENABLED, Value::Null),
    )
    .await;
    assert_eq!(response, MethodResponse::Success { value: json!(false) });
}
