//! Connectivity state and its signal source.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Connectivity of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// The backend is reachable.
    Online,
    /// Network unreachable or backend unavailable.
    Offline,
}

impl ConnectivityState {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        }
    }
}

/// Process-wide connectivity flag plus a stream of its transitions.
///
/// Constructed once by the host and handed to whoever needs it. Clones share
/// the same state. Only actual transitions are broadcast: setting the
/// current value again is silent.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<ConnectivityState>>,
}

impl ConnectivityMonitor {
    pub fn new(initial: ConnectivityState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    pub fn is_offline(&self) -> bool {
        self.state() == ConnectivityState::Offline
    }

    pub fn is_online(&self) -> bool {
        self.state() == ConnectivityState::Online
    }

    /// Report connectivity lost. Returns whether this was a transition.
    pub fn set_offline(&self) -> bool {
        self.set(ConnectivityState::Offline)
    }

    /// Report connectivity restored. Returns whether this was a transition.
    pub fn set_online(&self) -> bool {
        self.set(ConnectivityState::Online)
    }

    /// Record `state`; subscribers are woken only if it differs from the
    /// current one.
    pub fn set(&self, state: ConnectivityState) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });

        if changed {
            match state {
                ConnectivityState::Online => tracing::info!("connectivity restored"),
                ConnectivityState::Offline => tracing::warn!("connectivity lost"),
            }
        }
        changed
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}
