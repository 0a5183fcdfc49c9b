//! Backend reachability probe feeding the connectivity monitor.

use std::sync::Arc;
use std::time::Duration;

use brickerp_offline::{ConnectivityMonitor, ConnectivityState};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;

/// Periodically checks whether the backend answers.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    interval: Duration,
}

impl HealthProbe {
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            url: config.health_url(),
            api_key: config.api_key.clone(),
            interval: config.probe_interval,
        }
    }

    /// Single probe. Any answer other than a server error counts as
    /// reachable.
    pub async fn check(&self) -> ConnectivityState {
        let mut req = self.http.get(&self.url);
        if let Some(key) = &self.api_key {
            req = req.header("apikey", key);
        }

        let reachable = match req.send().await {
            Ok(resp) => !resp.status().is_server_error(),
            Err(err) => {
                tracing::debug!(url = %self.url, error = %err, "health probe failed");
                false
            }
        };
        ConnectivityState::from_reachable(reachable)
    }

    /// Probe on every interval tick and report into `monitor` until
    /// `shutdown` is notified.
    pub fn start(self, monitor: ConnectivityMonitor, shutdown: Arc<Notify>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(url = %self.url, interval = ?self.interval, "health probe started");

            let mut ticks = tokio::time::interval(self.interval);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.notified() => {
                        tracing::info!("health probe received shutdown signal");
                        break;
                    }
                    _ = ticks.tick() => {
                        let state = self.check().await;
                        monitor.set(state);
                    }
                }
            }

            tracing::info!("health probe stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{closed_address, respond_once};

    fn probe(api_url: String) -> HealthProbe {
        let config = ClientConfig {
            api_url,
            probe_interval: Duration::from_millis(20),
            ..ClientConfig::from_lookup(|name| {
                (name == "BRICKERP_DATA_DIR").then(|| "/tmp/brickerp-test".to_string())
            })
            .unwrap()
        };
        HealthProbe::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn answering_backend_is_online() {
        let (url, server) = respond_once(200, "{}").await;
        assert_eq!(probe(url).check().await, ConnectivityState::Online);
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /rest/v1/ HTTP/1.1"));
    }

    #[tokio::test]
    async fn client_errors_still_mean_reachable() {
        let (url, server) = respond_once(401, "no api key").await;
        assert_eq!(probe(url).check().await, ConnectivityState::Online);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn server_error_is_offline() {
        let (url, server) = respond_once(503, "maintenance").await;
        assert_eq!(probe(url).check().await, ConnectivityState::Offline);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_offline() {
        assert_eq!(
            probe(closed_address().await).check().await,
            ConnectivityState::Offline
        );
    }

    #[tokio::test]
    async fn running_probe_reports_loss_to_the_monitor() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
        let mut rx = monitor.subscribe();
        let shutdown = Arc::new(Notify::new());

        let handle = probe(closed_address().await).start(monitor.clone(), shutdown.clone());

        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == ConnectivityState::Offline))
            .await
            .unwrap()
            .unwrap();

        shutdown.notify_one();
        handle.await.unwrap();
    }
}
