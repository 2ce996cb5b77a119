//! Method-channel codec for the bridge command surface.
//!
//! A UI shell talks to the bridge with `{method, arguments}` calls and receives
//! a [`MethodResponse`]. Block events travel on a separate event channel as
//! `{"platform": string, "timestamp": int64}`.

use crate::BlockingBridge;
use focusguard_events::{BlockEvent, PlatformSettings};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command channel name.
pub const METHOD_CHANNEL: &str = "com.focusguard/blocking";

/// Event channel name.
pub const EVENT_CHANNEL: &str = "com.focusguard/blocking_events";

/// Event name carried on the event channel.
pub const EVENT_CONTENT_BLOCKED: &str = "onContentBlocked";

pub const METHOD_IS_ACCESSIBILITY_ENABLED: &str = "isAccessibilityServiceEnabled";
pub const METHOD_OPEN_ACCESSIBILITY_SETTINGS: &str = "openAccessibilitySettings";
pub const METHOD_SET_PROTECTION_ACTIVE: &str = "setProtectionActive";
pub const METHOD_IS_PROTECTION_ACTIVE: &str = "isProtectionActive";
pub const METHOD_SET_BLOCKED_PLATFORMS: &str = "setBlockedPlatforms";

/// One incoming call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Result of one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success { value: Value },
    NotImplemented,
    Error { code: String, message: String },
}

impl MethodResponse {
    fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    fn error(message: impl ToString) -> Self {
        Self::Error {
            code: "ERROR".to_string(),
            message: message.to_string(),
        }
    }
}

/// Decoded bridge command.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCommand {
    IsAccessibilityEnabled,
    OpenAccessibilitySettings,
    SetProtectionActive(bool),
    IsProtectionActive,
    SetBlockedPlatforms(PlatformSettings),
}

fn bool_arg(arguments: &Value, name: &str, default: bool) -> bool {
    arguments
        .get(name)
        .and_then(Value::as_bool)
        .unwrap_or(default)
}

impl BridgeCommand {
    /// Decode a call. Unknown methods return `None`.
    ///
    /// Missing `active` reads as `false`; missing platform flags read as `true`.
    pub fn decode(call: &MethodCall) -> Option<Self> {
        let args = &call.arguments;
        let command = match call.method.as_str() {
            METHOD_IS_ACCESSIBILITY_ENABLED => Self::IsAccessibilityEnabled,
            METHOD_OPEN_ACCESSIBILITY_SETTINGS => Self::OpenAccessibilitySettings,
            METHOD_SET_PROTECTION_ACTIVE => Self::SetProtectionActive(bool_arg(args, "active", false)),
            METHOD_IS_PROTECTION_ACTIVE => Self::IsProtectionActive,
            METHOD_SET_BLOCKED_PLATFORMS => Self::SetBlockedPlatforms(PlatformSettings {
                youtube_shorts: bool_arg(args, "youtube", true),
                instagram_reels: bool_arg(args, "instagram", true),
                facebook_reels: bool_arg(args, "facebook", true),
                tiktok: bool_arg(args, "tiktok", true),
                snapchat_spotlight: bool_arg(args, "snapchat", true),
            }),
            _ => return None,
        };
        Some(command)
    }
}

/// Encode platform flags as `setBlockedPlatforms` arguments.
pub fn encode_platforms(settings: &PlatformSettings) -> Value {
    serde_json::json!({
        "youtube": settings.youtube_shorts,
        "instagram": settings.instagram_reels,
        "facebook": settings.facebook_reels,
        "tiktok": settings.tiktok,
        "snapchat": settings.snapchat_spotlight,
    })
}

/// Encode a block event for the event channel.
pub fn encode_event(event: &BlockEvent) -> Value {
    serde_json::json!({
        "platform": event.platform,
        "timestamp": event.timestamp,
    })
}

/// Execute one call against a bridge.
pub async fn dispatch(bridge: &dyn BlockingBridge, call: &MethodCall) -> MethodResponse {
    let Some(command) = BridgeCommand::decode(call) else {
        tracing::warn!(method = %call.method, "unknown bridge method");
        return MethodResponse::NotImplemented;
    };

    tracing::debug!(?command, "bridge call");
    match command {
        BridgeCommand::IsAccessibilityEnabled => {
            MethodResponse::success(bridge.is_accessibility_enabled().await)
        }
        BridgeCommand::OpenAccessibilitySettings => {
            bridge.open_permission_settings().await;
            MethodResponse::success(Value::Null)
        }
        BridgeCommand::SetProtectionActive(active) => {
            match bridge.set_protection_active(active).await {
                Ok(written) => MethodResponse::success(written),
                Err(e) => MethodResponse::error(e),
            }
        }
        BridgeCommand::IsProtectionActive => match bridge.is_protection_active().await {
            Ok(active) => MethodResponse::success(active),
            Err(e) => MethodResponse::error(e),
        },
        BridgeCommand::SetBlockedPlatforms(settings) => {
            match bridge.set_blocked_platforms(settings).await {
                Ok(written) => MethodResponse::success(written),
                Err(e) => MethodResponse::error(e),
            }
        }
    }
}
