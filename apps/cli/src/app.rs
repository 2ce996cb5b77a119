//! Process wiring: one database, one emitter, one bridge, one store.

use crate::simulated::{ConsoleDismisser, SimulatedProbe};
use anyhow::Context;
use focusguard_application::{AppConfig, ProtectionStore, StoreHandle, SystemClock};
use focusguard_bridge::{select_bridge, BlockEventEmitter, BridgeRef, NativeBridge};
use focusguard_detect::{EnforcementService, OverlayTiming, Screen, ServiceOptions};
use focusguard_events::NullEventBus;
use focusguard_storage::{Database, EventLogHandle};
use std::sync::Arc;

pub struct App {
    pub config: AppConfig,
    pub probe: Arc<SimulatedProbe>,
    pub bridge: BridgeRef,
    pub service: Arc<EnforcementService>,
    pub store: StoreHandle,
}

impl App {
    /// Open the database, connect the enforcement service and hydrate the store.
    pub async fn start(config: AppConfig) -> anyhow::Result<Self> {
        let database = Arc::new(Database::open(&config.database_path).with_context(|| {
            format!("failed to open database at {}", config.database_path.display())
        })?);

        let emitter = BlockEventEmitter::new();
        let service = EnforcementService::connect(
            database.clone(),
            emitter.clone(),
            Arc::new(ConsoleDismisser),
            service_options(&config),
        );

        let probe = Arc::new(SimulatedProbe::new(&config.package_id, database.clone()));
        let native = NativeBridge::new(&config.package_id, probe.clone(), database.clone(), emitter)
            .with_reload(service.clone());
        let bridge = select_bridge(Some(native));

        let store = ProtectionStore::spawn(
            bridge.clone(),
            Arc::new(EventLogHandle::from_database(database)),
            Arc::new(NullEventBus),
            Arc::new(SystemClock),
            config.store_options(),
        );
        store.hydrate().await.context("failed to hydrate protection store")?;

        Ok(Self {
            config,
            probe,
            bridge,
            service,
            store,
        })
    }

    pub async fn shutdown(self) {
        self.store.shutdown().await;
    }
}

fn service_options(config: &AppConfig) -> ServiceOptions {
    ServiceOptions {
        check_interval: config.check_interval(),
        fallback_screen: Screen::default(),
        overlay: OverlayTiming {
            display: config.overlay_duration(),
            back_repeat: config.back_repeat_delay(),
        },
    }
}
