//! Process wiring shared by the CLI commands.

use std::sync::Arc;

use anyhow::Context;
use brickerp_numbering::NumberGenerator;
use brickerp_offline::{ConnectivityMonitor, ConnectivityState, OfflineQueue};
use brickerp_store::{LocalStorage, SqliteStore};
use tokio::sync::Notify;

use crate::config::ClientConfig;
use crate::http::RestBackend;
use crate::probe::HealthProbe;

/// Services of one client process.
///
/// Built once at startup and passed around explicitly; nothing here is a
/// global.
pub struct Client {
    pub config: ClientConfig,
    pub storage: LocalStorage,
    pub numbering: Arc<NumberGenerator>,
    pub connectivity: ConnectivityMonitor,
    pub queue: Arc<OfflineQueue>,
    probe: HealthProbe,
}

impl Client {
    /// HTTP client shared by the backend and the probe.
    pub fn http_client(config: &ClientConfig) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")
    }

    /// Probe the backend once to learn the startup connectivity.
    pub async fn detect_connectivity(config: &ClientConfig) -> anyhow::Result<ConnectivityState> {
        let probe = HealthProbe::new(Self::http_client(config)?, config);
        Ok(probe.check().await)
    }

    /// Open the local store and assemble the services.
    pub async fn open(config: ClientConfig, initial: ConnectivityState) -> anyhow::Result<Self> {
        let db_path = config.database_path();
        let store = SqliteStore::open(&db_path)
            .await
            .with_context(|| format!("failed to open local store at {:?}", db_path))?;
        Self::with_store(config, LocalStorage::new(Arc::new(store)), initial).await
    }

    /// Assemble the services on top of an already opened store.
    pub async fn with_store(
        config: ClientConfig,
        storage: LocalStorage,
        initial: ConnectivityState,
    ) -> anyhow::Result<Self> {
        let http = Self::http_client(&config)?;
        let backend = Arc::new(RestBackend::new(http.clone(), &config));
        let probe = HealthProbe::new(http, &config);

        let connectivity = ConnectivityMonitor::new(initial);
        let numbering = Arc::new(NumberGenerator::new(storage.clone()));
        let queue = OfflineQueue::open(storage.clone(), backend, connectivity.clone())
            .await
            .context("failed to load the offline queue")?;

        Ok(Self {
            config,
            storage,
            numbering,
            connectivity,
            queue: Arc::new(queue),
            probe,
        })
    }

    /// Keep connectivity and the queue in step until ctrl-c.
    pub async fn run_until_shutdown(self) -> anyhow::Result<()> {
        let probe_shutdown = Arc::new(Notify::new());
        let queue_shutdown = Arc::new(Notify::new());

        let listener = self.queue.clone().run(queue_shutdown.clone());
        let probe = self
            .probe
            .clone()
            .start(self.connectivity.clone(), probe_shutdown.clone());

        if self.connectivity.is_online() && !self.queue.is_empty().await {
            tracing::info!(
                pending = self.queue.len().await,
                "replaying operations left from a previous session"
            );
            self.queue.spawn_drain();
        }

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;
        tracing::info!("shutting down");

        probe_shutdown.notify_one();
        queue_shutdown.notify_one();
        probe.await.context("health probe task panicked")?;
        listener.await.context("offline queue listener panicked")?;
        Ok(())
    }
}
