//! Queue state machine.
//!
//! ```text
//! OnlineIdle --lost--> OfflineBuffering --restored, queue empty--> OnlineIdle
//!                      OfflineBuffering --restored, queue non-empty--> Syncing
//! Syncing --lost--> OfflineBuffering
//! Syncing --pass finished--> OnlineIdle or OfflineBuffering (current connectivity)
//! ```

use serde::{Deserialize, Serialize};

use crate::connectivity::ConnectivityState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    OnlineIdle,
    OfflineBuffering,
    Syncing,
}

/// A state change (or a non-change, when `from == to`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: QueueState,
    pub to: QueueState,
}

impl Transition {
    /// Whether this transition starts a drain pass.
    pub fn starts_sync(&self) -> bool {
        self.from != QueueState::Syncing && self.to == QueueState::Syncing
    }
}

impl QueueState {
    /// State with no pass running: at startup and once a pass closes.
    pub fn at_rest(connectivity: ConnectivityState) -> Self {
        match connectivity {
            ConnectivityState::Online => QueueState::OnlineIdle,
            ConnectivityState::Offline => QueueState::OfflineBuffering,
        }
    }

    /// Next state after a connectivity signal.
    pub fn on_connectivity(self, connectivity: ConnectivityState, has_pending: bool) -> Self {
        match (self, connectivity) {
            (_, ConnectivityState::Offline) => QueueState::OfflineBuffering,
            (QueueState::OfflineBuffering, ConnectivityState::Online) if has_pending => {
                QueueState::Syncing
            }
            (QueueState::OfflineBuffering, ConnectivityState::Online) => QueueState::OnlineIdle,
            (state, ConnectivityState::Online) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ConnectivityState::{Offline, Online};

    #[test]
    fn resting_state_follows_connectivity() {
        assert_eq!(QueueState::at_rest(Online), QueueState::OnlineIdle);
        assert_eq!(QueueState::at_rest(Offline), QueueState::OfflineBuffering);
    }

    #[test]
    fn losing_connectivity_always_buffers() {
        for state in [QueueState::OnlineIdle, QueueState::OfflineBuffering, QueueState::Syncing] {
            assert_eq!(state.on_connectivity(Offline, true), QueueState::OfflineBuffering);
        }
    }

    #[test]
    fn restore_syncs_only_when_something_is_queued() {
        let buffering = QueueState::OfflineBuffering;
        assert_eq!(buffering.on_connectivity(Online, true), QueueState::Syncing);
        assert_eq!(buffering.on_connectivity(Online, false), QueueState::OnlineIdle);
    }

    #[test]
    fn duplicate_online_signal_changes_nothing() {
        assert_eq!(QueueState::OnlineIdle.on_connectivity(Online, true), QueueState::OnlineIdle);
        assert_eq!(QueueState::Syncing.on_connectivity(Online, true), QueueState::Syncing);
    }

    #[test]
    fn only_entering_syncing_starts_a_pass() {
        let start = Transition { from: QueueState::OfflineBuffering, to: QueueState::Syncing };
        let stay = Transition { from: QueueState::Syncing, to: QueueState::Syncing };
        assert!(start.starts_sync());
        assert!(!stay.starts_sync());
    }
}
