//! `brickerp-offline`
//!
//! **Responsibility:** keep the client usable without a network.
//!
//! This crate provides:
//! - Connectivity tracking (`ConnectivityMonitor`), injected rather than global
//! - Typed pending writes (`PendingOperation`) and the backend they replay to
//! - A persisted queue that buffers writes while offline and drains them once
//!   connectivity returns (`OfflineQueue`)

pub mod backend;
pub mod connectivity;
pub mod error;
pub mod operation;
pub mod queue;
pub mod state;

pub use backend::{BackendError, RemoteBackend};
pub use connectivity::{ConnectivityMonitor, ConnectivityState};
pub use error::QueueError;
pub use operation::{PendingOperation, QueuedOperation, Record, Table};
pub use queue::{DrainReport, OfflineQueue, SubmitOutcome, PENDING_OPERATIONS_KEY};
pub use state::{QueueState, Transition};
