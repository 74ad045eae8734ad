//! Top-level wiring: host → producer → store → scheduler, plus the API server.
//! Admin start/stop/reload operations map onto this type.
//! Used by: main.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::Result;
use crate::host::{HostPerformanceProbe, HostState};
use crate::scheduler::Scheduler;
use crate::server::ApiServer;
use crate::snapshot::{SnapshotProducer, SnapshotStore};
use crate::tps::TpsEstimator;

pub struct StatusService {
    settings: Settings,
    store: Arc<SnapshotStore>,
    scheduler: Scheduler,
    api: ApiServer,
}

impl StatusService {
    /// Captures the first snapshot immediately so `/api/status` is never empty.
    pub fn new(
        settings: Settings,
        host: Arc<dyn HostState>,
        probe: Arc<dyn HostPerformanceProbe>,
    ) -> Self {
        let mut producer = SnapshotProducer::new(host, TpsEstimator::new(probe));
        let store = Arc::new(SnapshotStore::new(producer.produce()));
        Self {
            scheduler: Scheduler::new(producer, Arc::clone(&store)),
            api: ApiServer::new(Arc::clone(&store), settings.clone()),
            store,
            settings,
        }
    }

    /// Starts the API and the update schedule. An API failure is logged and
    /// the schedule still runs, so a later `start_api` can serve fresh data.
    pub async fn enable(&mut self) {
        if self.api.start().await.is_err() {
            tracing::warn!("continuing without API server; use `start` once fixed");
        }
        self.scheduler.start(self.settings.update_period());
        tracing::info!("status service enabled");
    }

    pub async fn disable(&mut self) {
        self.scheduler.cancel();
        self.api.stop().await;
        tracing::info!("status service disabled");
    }

    pub async fn start_api(&mut self) -> Result<()> {
        self.api.start().await
    }

    pub async fn stop_api(&mut self) {
        self.api.stop().await;
    }

    /// New settings apply to the schedule now and to the API on its next start.
    pub fn reload(&mut self, settings: Settings) {
        self.api.set_settings(settings.clone());
        self.settings = settings;
        self.scheduler.start(self.settings.update_period());
        tracing::info!(
            update_interval = self.settings.update_interval,
            "configuration reloaded"
        );
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn is_api_running(&self) -> bool {
        self.api.is_running()
    }

    pub fn api_addr(&self) -> Option<SocketAddr> {
        self.api.local_addr()
    }

    pub fn is_updating(&self) -> bool {
        self.scheduler.is_scheduled()
    }
}
