//! Persisted queue of pending operations.
//!
//! The queue lives in memory and is written through to the local store (key
//! [`PENDING_OPERATIONS_KEY`]) on every mutation, so it survives a restart.
//! Backend calls made while draining happen outside the queue lock: `enqueue`
//! never waits on the network.

use std::collections::VecDeque;
use std::sync::Arc;

use brickerp_core::{Clock, SystemClock};
use brickerp_store::LocalStorage;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;

use crate::backend::RemoteBackend;
use crate::connectivity::{ConnectivityMonitor, ConnectivityState};
use crate::error::QueueError;
use crate::operation::{PendingOperation, QueuedOperation};
use crate::state::{QueueState, Transition};

/// Store key of the persisted queue (inside the storage namespace).
pub const PENDING_OPERATIONS_KEY: &str = "pending_operations";

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Operations applied and removed from the queue.
    pub applied: usize,
    /// Operations that failed and were put back.
    pub failed: usize,
    /// Queue length after the pass.
    pub remaining: usize,
    /// The pass stopped early because connectivity was lost.
    pub interrupted: bool,
}

/// What `submit` did with an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Applied,
    Queued(QueuedOperation),
}

/// Entries taken out of `pending` by a running drain pass.
#[derive(Debug, Default)]
struct DrainPass {
    unattempted: VecDeque<QueuedOperation>,
    retry: Vec<QueuedOperation>,
}

#[derive(Debug, Default)]
struct QueueInner {
    /// Outside a pass: the whole queue. During a pass: entries enqueued
    /// since the pass started.
    pending: VecDeque<QueuedOperation>,
    pass: Option<DrainPass>,
    /// A drain was requested while the current pass was running.
    rerun: bool,
}

impl QueueInner {
    /// Queue order: not yet attempted, then failed retries, then entries
    /// enqueued while the pass was running.
    fn ordered(&self) -> Vec<QueuedOperation> {
        let mut out = Vec::with_capacity(self.len());
        if let Some(pass) = &self.pass {
            out.extend(pass.unattempted.iter().cloned());
            out.extend(pass.retry.iter().cloned());
        }
        out.extend(self.pending.iter().cloned());
        out
    }

    fn len(&self) -> usize {
        let in_pass = self
            .pass
            .as_ref()
            .map(|p| p.unattempted.len() + p.retry.len())
            .unwrap_or(0);
        in_pass + self.pending.len()
    }

    fn open_pass(&mut self) {
        let unattempted = std::mem::take(&mut self.pending);
        self.pass = Some(DrainPass {
            unattempted,
            retry: Vec::new(),
        });
        self.rerun = false;
    }

    /// Fold a finished (or interrupted) pass back into `pending`.
    fn close_pass(&mut self) {
        if let Some(pass) = self.pass.take() {
            let mut merged = pass.unattempted;
            merged.extend(pass.retry);
            merged.extend(self.pending.drain(..));
            self.pending = merged;
        }
    }
}

/// Offline operation queue.
///
/// One instance per process, shared behind an `Arc`.
pub struct OfflineQueue {
    storage: LocalStorage,
    backend: Arc<dyn RemoteBackend>,
    connectivity: ConnectivityMonitor,
    clock: Arc<dyn Clock>,
    inner: Mutex<QueueInner>,
    state: watch::Sender<QueueState>,
}

impl OfflineQueue {
    /// Load the persisted queue and start in the state matching current
    /// connectivity.
    pub async fn open(
        storage: LocalStorage,
        backend: Arc<dyn RemoteBackend>,
        connectivity: ConnectivityMonitor,
    ) -> Result<Self, QueueError> {
        let persisted: Vec<QueuedOperation> = storage
            .load_local(PENDING_OPERATIONS_KEY)
            .await?
            .unwrap_or_default();

        let initial = QueueState::at_rest(connectivity.state());
        tracing::info!(
            pending = persisted.len(),
            state = ?initial,
            "offline queue opened"
        );

        let (state, _rx) = watch::channel(initial);

        Ok(Self {
            storage,
            backend,
            connectivity,
            clock: Arc::new(SystemClock),
            inner: Mutex::new(QueueInner {
                pending: persisted.into(),
                pass: None,
                rerun: false,
            }),
            state,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> QueueState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<QueueState> {
        self.state.subscribe()
    }

    /// Queued operations in replay order.
    pub async fn pending(&self) -> Vec<QueuedOperation> {
        self.inner.lock().await.ordered()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn persist(&self, inner: &QueueInner) -> Result<(), QueueError> {
        self.storage
            .save_local(PENDING_OPERATIONS_KEY, &inner.ordered())
            .await?;
        Ok(())
    }

    /// Append an operation to the tail of the queue and persist it.
    ///
    /// If the write fails the operation is not kept in memory either.
    pub async fn enqueue(&self, operation: PendingOperation) -> Result<QueuedOperation, QueueError> {
        let entry = QueuedOperation::new(operation, self.clock.now());

        let mut inner = self.inner.lock().await;
        inner.pending.push_back(entry.clone());

        if let Err(err) = self.persist(&inner).await {
            inner.pending.pop_back();
            tracing::error!(error = %err, "failed to persist pending operation");
            return Err(err);
        }

        tracing::debug!(
            id = %entry.id,
            kind = entry.operation.kind_name(),
            table = %entry.operation.table(),
            queued = inner.len(),
            "operation queued"
        );
        Ok(entry)
    }

    /// Apply directly when online with nothing queued ahead; otherwise (or if
    /// the backend call fails) queue the operation.
    pub async fn submit(&self, operation: PendingOperation) -> Result<SubmitOutcome, QueueError> {
        if self.connectivity.is_online() && self.is_empty().await {
            match operation.replay(self.backend.as_ref()).await {
                Ok(()) => return Ok(SubmitOutcome::Applied),
                Err(err) => {
                    tracing::warn!(
                        kind = operation.kind_name(),
                        table = %operation.table(),
                        error = %err,
                        "direct write failed; queuing for replay"
                    );
                }
            }
        }

        let entry = self.enqueue(operation).await?;
        Ok(SubmitOutcome::Queued(entry))
    }

    /// Feed a connectivity signal into the state machine.
    pub async fn handle_connectivity(&self, connectivity: ConnectivityState) -> Transition {
        let has_pending = !self.is_empty().await;

        let mut transition = Transition {
            from: self.state(),
            to: self.state(),
        };
        self.state.send_modify(|state| {
            transition.from = *state;
            *state = state.on_connectivity(connectivity, has_pending);
            transition.to = *state;
        });

        if transition.from != transition.to {
            tracing::info!(from = ?transition.from, to = ?transition.to, "offline queue state changed");
        }
        transition
    }

    /// Attempt every queued operation once, head to tail.
    ///
    /// Applied operations are removed; failed ones are kept, behind anything
    /// not yet attempted. Stops early if connectivity is lost. Attempts
    /// nothing while offline. A drain requested while a pass is running is
    /// folded into that pass: if the connection is up when it closes and
    /// entries are left that it never attempted, another pass follows.
    pub async fn drain(&self) -> Result<DrainReport, QueueError> {
        {
            let mut inner = self.inner.lock().await;
            if inner.pass.is_some() {
                tracing::debug!("drain already in progress");
                inner.rerun = true;
                return Ok(DrainReport {
                    remaining: inner.len(),
                    ..DrainReport::default()
                });
            }
            if self.connectivity.is_offline() {
                tracing::debug!("skipping drain - offline");
                return Ok(DrainReport {
                    remaining: inner.len(),
                    ..DrainReport::default()
                });
            }
            inner.open_pass();
            self.state.send_replace(QueueState::Syncing);
        }

        let mut report = DrainReport::default();

        loop {
            self.attempt_pass(&mut report).await;

            let mut inner = self.inner.lock().await;
            let rerun = inner.rerun;
            let untried = inner.pending.len()
                + inner.pass.as_ref().map_or(0, |pass| pass.unattempted.len());
            inner.close_pass();
            let persisted = self.persist(&inner).await;
            let connectivity = self.connectivity.state();

            if rerun && untried > 0 && connectivity == ConnectivityState::Online {
                if let Err(err) = persisted {
                    tracing::error!(error = %err, "failed to persist queue between passes");
                }
                tracing::debug!(queued = inner.len(), "starting follow-up pass");
                inner.open_pass();
                report.interrupted = false;
                continue;
            }

            report.remaining = inner.len();
            // Set under the queue lock so a concurrent signal is applied on top.
            self.state.send_replace(QueueState::at_rest(connectivity));
            drop(inner);

            tracing::info!(
                applied = report.applied,
                failed = report.failed,
                remaining = report.remaining,
                interrupted = report.interrupted,
                "drain pass finished"
            );

            persisted?;
            return Ok(report);
        }
    }

    /// Replay the open pass entry by entry until it is exhausted or the
    /// connection drops.
    async fn attempt_pass(&self, report: &mut DrainReport) {
        loop {
            if self.connectivity.is_offline() {
                report.interrupted = true;
                return;
            }

            let next = {
                let inner = self.inner.lock().await;
                inner
                    .pass
                    .as_ref()
                    .and_then(|pass| pass.unattempted.front().cloned())
            };
            let Some(entry) = next else {
                return;
            };

            let outcome = entry.operation.replay(self.backend.as_ref()).await;

            let mut inner = self.inner.lock().await;
            let Some(pass) = inner.pass.as_mut() else {
                return;
            };
            pass.unattempted.pop_front();

            match outcome {
                Ok(()) => {
                    report.applied += 1;
                    tracing::debug!(
                        id = %entry.id,
                        kind = entry.operation.kind_name(),
                        table = %entry.operation.table(),
                        "replayed pending operation"
                    );
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        id = %entry.id,
                        kind = entry.operation.kind_name(),
                        table = %entry.operation.table(),
                        record = entry.operation.record_id().unwrap_or("-"),
                        error = %err,
                        "replay failed; operation kept for the next pass"
                    );
                    pass.retry.push(entry);
                }
            }

            if let Err(err) = self.persist(&inner).await {
                tracing::error!(error = %err, "failed to persist queue during drain");
            }
        }
    }

    /// Run a drain pass in the background, logging any storage failure.
    pub fn spawn_drain(self: &Arc<Self>) -> JoinHandle<()> {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = queue.drain().await {
                tracing::error!(error = %err, "drain pass failed");
            }
        })
    }

    /// Listen for connectivity transitions until `shutdown` is notified.
    ///
    /// Each restore that finds queued operations starts a drain pass in its
    /// own task, so a loss arriving mid-pass is still handled promptly.
    /// The channel only keeps the latest value: an offline/online flap
    /// between two wakeups reads as a single `Online` with no state change,
    /// so any observed `Online` with entries queued counts as a restore.
    pub fn run(self: Arc<Self>, shutdown: Arc<Notify>) -> JoinHandle<()> {
        let mut signals = self.connectivity.subscribe();

        tokio::spawn(async move {
            tracing::info!("offline queue listener started");

            loop {
                tokio::select! {
                    _ = shutdown.notified() => {
                        tracing::info!("offline queue listener received shutdown signal");
                        break;
                    }
                    changed = signals.changed() => {
                        if changed.is_err() {
                            tracing::debug!("connectivity source dropped");
                            break;
                        }
                        let connectivity = *signals.borrow_and_update();
                        let transition = self.handle_connectivity(connectivity).await;
                        let restored = connectivity == ConnectivityState::Online
                            && !self.is_empty().await;
                        if transition.starts_sync() || restored {
                            self.spawn_drain();
                        }
                    }
                }
            }

            tracing::info!("offline queue listener stopped");
        })
    }
}
