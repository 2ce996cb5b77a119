//! The protection store actor.
//!
//! ```text
//!  StoreHandle ──Command──▶ ┌──────────────────┐ ──watch──▶ ProtectionSnapshot
//!                           │  ProtectionStore │ ──bus────▶ protection:* topics
//!  BlockingBridge ─events─▶ └──────────────────┘
//!                                    │
//!                                    ▼
//!                              BlockEventLog
//! ```
//!
//! The owner task is the only writer of the snapshot. Commands and bridge
//! events are handled one at a time in arrival order.

use crate::clock::Clock;
use crate::constants::{COMMAND_CHANNEL_CAPACITY, EVENT_CHANNEL_CAPACITY, HISTORY_CAPACITY};
use crate::error::{Result, StoreError};
use crate::state::{Phase, ProtectionSnapshot};
use focusguard_bridge::channel::encode_event;
use focusguard_bridge::{BlockEventStream, BridgeRef};
use focusguard_events::{
    BlockEvent, EventBusRef, Platform, PlatformSettings, TOPIC_CONTENT_BLOCKED,
    TOPIC_PERMISSION_REQUIRED, TOPIC_STATE,
};
use focusguard_storage::BlockEventLog;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub history_capacity: usize,
    pub command_capacity: usize,
    /// Buffer of the bridge event subscription.
    pub event_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            command_capacity: COMMAND_CHANNEL_CAPACITY,
            event_capacity: EVENT_CHANNEL_CAPACITY,
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Hydrate(Reply<ProtectionSnapshot>),
    ToggleProtection(Reply<bool>),
    RefreshPermission(Reply<bool>),
    UpdateSetting {
        platform: Platform,
        enabled: bool,
        reply: Reply<PlatformSettings>,
    },
    RefreshStats(Reply<ProtectionSnapshot>),
}

/// Cloneable front door to a running [`ProtectionStore`].
#[derive(Clone)]
pub struct StoreHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ProtectionSnapshot>,
    cancel: CancellationToken,
}

impl StoreHandle {
    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)?
    }

    /// Load persisted state and start listening for block events.
    ///
    /// Runs once; later calls return the current snapshot.
    pub async fn hydrate(&self) -> Result<ProtectionSnapshot> {
        self.request(Command::Hydrate).await
    }

    /// Flip the protection flag. Returns the resulting flag.
    ///
    /// Without accessibility permission this opens the permission settings
    /// instead and leaves the flag unchanged.
    pub async fn toggle_protection(&self) -> Result<bool> {
        self.request(Command::ToggleProtection).await
    }

    /// Re-read the accessibility permission. Returns the new value.
    pub async fn refresh_permission(&self) -> Result<bool> {
        self.request(Command::RefreshPermission).await
    }

    pub async fn update_setting(&self, platform: Platform, enabled: bool) -> Result<PlatformSettings> {
        self.request(|reply| Command::UpdateSetting {
            platform,
            enabled,
            reply,
        })
        .await
    }

    /// Re-query today's count and the recent activity from the event log.
    pub async fn refresh_stats(&self) -> Result<ProtectionSnapshot> {
        self.request(Command::RefreshStats).await
    }

    /// Latest published state.
    pub fn snapshot(&self) -> ProtectionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProtectionSnapshot> {
        self.state.clone()
    }

    /// Stop the owner task and wait until it has released its resources.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.commands.closed().await;
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Single owner of the UI-visible protection state.
pub struct ProtectionStore {
    bridge: BridgeRef,
    log: Arc<dyn BlockEventLog>,
    bus: EventBusRef,
    clock: Arc<dyn Clock>,
    options: StoreOptions,
    state: ProtectionSnapshot,
    /// Start of the day `blocked_today` counts.
    day_start_ms: i64,
    events: Option<BlockEventStream>,
    publisher: watch::Sender<ProtectionSnapshot>,
}

impl ProtectionStore {
    /// Spawn the owner task on the current tokio runtime.
    pub fn spawn(
        bridge: BridgeRef,
        log: Arc<dyn BlockEventLog>,
        bus: EventBusRef,
        clock: Arc<dyn Clock>,
        options: StoreOptions,
    ) -> StoreHandle {
        let (commands_tx, commands_rx) = mpsc::channel(options.command_capacity.max(1));
        let (publisher, state) = watch::channel(ProtectionSnapshot::default());
        let cancel = CancellationToken::new();

        let store = Self {
            bridge,
            log,
            bus,
            clock,
            options,
            state: ProtectionSnapshot::default(),
            day_start_ms: 0,
            events: None,
            publisher,
        };
        tokio::spawn(store.run(commands_rx, cancel.clone()));

        StoreHandle {
            commands: commands_tx,
            state,
            cancel,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>, cancel: CancellationToken) {
        tracing::debug!("protection store started");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                event = next_event(&mut self.events) => match event {
                    Some(event) => self.on_block_event(event),
                    None => {
                        tracing::debug!("block event stream ended");
                        self.events = None;
                    }
                },
            }
        }

        if let Some(stream) = self.events.take() {
            stream.cancel();
        }
        tracing::info!("protection store stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Hydrate(reply) => {
                let _ = reply.send(Ok(self.hydrate().await));
            }
            Command::ToggleProtection(reply) => {
                let _ = reply.send(self.toggle_protection().await);
            }
            Command::RefreshPermission(reply) => {
                let _ = reply.send(self.refresh_permission().await);
            }
            Command::UpdateSetting {
                platform,
                enabled,
                reply,
            } => {
                let _ = reply.send(self.update_setting(platform, enabled).await);
            }
            Command::RefreshStats(reply) => {
                let _ = reply.send(self.refresh_stats());
            }
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state.is_ready() {
            Ok(())
        } else {
            Err(StoreError::NotReady)
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }

    fn publish_and_notify(&self) {
        self.publish();
        match serde_json::to_value(&self.state) {
            Ok(payload) => self.bus.emit(TOPIC_STATE, payload),
            Err(e) => tracing::warn!("failed to encode protection state: {e}"),
        }
    }

    async fn hydrate(&mut self) -> ProtectionSnapshot {
        if self.state.phase != Phase::Uninitialized {
            tracing::debug!(phase = ?self.state.phase, "already hydrated");
            return self.state.clone();
        }

        self.state.phase = Phase::Hydrating;
        self.publish();

        if let Err(e) = self.log.prepare() {
            tracing::error!("failed to open event log: {e}");
        }

        self.state.has_permission = self.bridge.is_accessibility_enabled().await;
        self.state.active = match self.bridge.is_protection_active().await {
            Ok(active) => active,
            Err(e) => {
                tracing::error!("failed to read protection flag: {e}");
                false
            }
        };
        self.state.platform_settings = match self.bridge.blocked_platforms().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("failed to read platform settings: {e}");
                PlatformSettings::default()
            }
        };

        self.day_start_ms = self.clock.day_start_ms(self.clock.now_ms());
        self.state.blocked_today = self.log.count_since(self.day_start_ms).unwrap_or_else(|e| {
            tracing::error!("failed to count today's blocks: {e}");
            0
        });
        self.state.recent_activity = self
            .log
            .most_recent(self.options.history_capacity)
            .unwrap_or_else(|e| {
                tracing::error!("failed to load recent activity: {e}");
                Vec::new()
            });

        if self.bridge.is_supported() {
            self.events = Some(self.bridge.subscribe(self.options.event_capacity));
        } else {
            tracing::debug!("bridge has no enforcement capability, not subscribing");
        }
        self.state.phase = Phase::Ready;

        tracing::info!(
            active = self.state.active,
            has_permission = self.state.has_permission,
            blocked_today = self.state.blocked_today,
            recent = self.state.recent_activity.len(),
            "protection store hydrated"
        );
        self.publish_and_notify();
        self.state.clone()
    }

    /// Recount `blocked_today` from the log if the local day changed since
    /// the count was taken. Returns true on a day change.
    fn roll_over_day(&mut self) -> bool {
        let day_start = self.clock.day_start_ms(self.clock.now_ms());
        if day_start == self.day_start_ms {
            return false;
        }

        self.day_start_ms = day_start;
        self.state.blocked_today = self.log.count_since(day_start).unwrap_or_else(|e| {
            tracing::error!("failed to recount after day change: {e}");
            0
        });
        tracing::debug!(blocked_today = self.state.blocked_today, "day changed, count reset");
        true
    }

    async fn toggle_protection(&mut self) -> Result<bool> {
        self.ensure_ready()?;
        if self.roll_over_day() {
            self.publish_and_notify();
        }

        if !self.state.has_permission {
            tracing::info!("accessibility permission missing, opening settings");
            self.bridge.open_permission_settings().await;
            self.bus
                .emit(TOPIC_PERMISSION_REQUIRED, serde_json::json!({ "active": self.state.active }));
            return Ok(self.state.active);
        }

        let next = !self.state.active;
        match self.bridge.set_protection_active(next).await {
            Ok(true) => {
                self.state.active = next;
                tracing::info!(active = next, "protection toggled");
                self.publish_and_notify();
            }
            Ok(false) => tracing::warn!(active = next, "bridge did not apply protection flag"),
            Err(e) => {
                tracing::error!(active = next, "failed to write protection flag: {e}");
                return Err(e.into());
            }
        }
        Ok(self.state.active)
    }

    async fn refresh_permission(&mut self) -> Result<bool> {
        self.ensure_ready()?;
        self.roll_over_day();

        let has_permission = self.bridge.is_accessibility_enabled().await;
        if has_permission != self.state.has_permission {
            tracing::info!(has_permission, "accessibility permission changed");
        }
        self.state.has_permission = has_permission;
        self.publish_and_notify();
        Ok(has_permission)
    }

    async fn update_setting(&mut self, platform: Platform, enabled: bool) -> Result<PlatformSettings> {
        self.ensure_ready()?;
        self.roll_over_day();

        self.state.platform_settings.set(platform, enabled);
        self.publish_and_notify();

        let settings = self.state.platform_settings;
        if let Err(e) = self.bridge.set_blocked_platforms(settings).await {
            tracing::error!(%platform, enabled, "failed to write platform settings: {e}");
        }
        Ok(settings)
    }

    fn refresh_stats(&mut self) -> Result<ProtectionSnapshot> {
        self.ensure_ready()?;

        let day_start = self.clock.day_start_ms(self.clock.now_ms());
        let blocked_today = self.log.count_since(day_start).map_err(|e| {
            tracing::error!("failed to count today's blocks: {e}");
            e
        })?;
        let recent = self
            .log
            .most_recent(self.options.history_capacity)
            .map_err(|e| {
                tracing::error!("failed to load recent activity: {e}");
                e
            })?;

        self.day_start_ms = day_start;
        self.state.blocked_today = blocked_today;
        self.state.recent_activity = recent;
        self.publish_and_notify();
        Ok(self.state.clone())
    }

    fn on_block_event(&mut self, event: BlockEvent) {
        tracing::info!(platform = %event.platform, timestamp = event.timestamp, "content blocked");
        self.roll_over_day();

        if let Err(e) = self.log.append(&event.platform, event.timestamp) {
            tracing::error!(platform = %event.platform, "failed to record block event: {e}");
        }
        self.state.blocked_today += 1;

        self.bus.emit(TOPIC_CONTENT_BLOCKED, encode_event(&event));
        self.state.push_recent(event, self.options.history_capacity);
        self.publish_and_notify();
    }
}

async fn next_event(events: &mut Option<BlockEventStream>) -> Option<BlockEvent> {
    match events {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}
