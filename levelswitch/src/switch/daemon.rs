//! Switch daemon: the single event loop that owns the controller.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        SwitchDaemon                          │
//! │                                                              │
//! │  SwitchHandle ──► Snapshot ──┐                               │
//! │                              ▼                               │
//! │                       ┌─────────────┐                        │
//! │                       │    queue    │ (one mpsc, FIFO)       │
//! │                       └──────┬──────┘                        │
//! │                              ▼                               │
//! │                    ┌──────────────────┐                      │
//! │                    │ SwitchController │──► Issue ──┐         │
//! │                    └──────────────────┘            ▼         │
//! │                              ▲            MapLoadClient task │
//! │                              │                     │         │
//! │                              └── LoadCompleted ◄───┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots and completions share one queue and are handled one at a
//! time, so the controller needs no locking. The daemon keeps only a weak
//! sender to the queue: once every [`SwitchHandle`] is dropped and no load
//! is outstanding, the queue closes and the daemon stops on its own.
//!
//! # Example
//!
//! ```ignore
//! let (daemon, handle) = SwitchDaemon::new(config, controller, client, metrics);
//!
//! let shutdown = CancellationToken::new();
//! let task = tokio::spawn(daemon.run(shutdown.clone()));
//!
//! handle.submit(snapshot).await?;
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::controller::{
    CompletionOutcome, LoadCompletion, LoadRequest, SnapshotOutcome, SwitchController,
};
use crate::fleet::FleetSnapshot;
use crate::loader::{LoadResult, MapLoadClient};
use crate::telemetry::SwitchMetrics;

// =============================================================================
// Configuration
// =============================================================================

/// Default capacity of the daemon's event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Configuration for the switch daemon.
#[derive(Clone, Debug)]
pub struct SwitchDaemonConfig {
    /// Event queue capacity. Producers wait when the queue is full.
    pub queue_capacity: usize,
}

impl Default for SwitchDaemonConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

// =============================================================================
// Events and handle
// =============================================================================

/// Message on the daemon's queue.
#[derive(Debug, Clone)]
pub enum SwitchEvent {
    /// A fleet snapshot arrived.
    Snapshot(FleetSnapshot),
    /// An issued load finished.
    LoadCompleted(LoadCompletion),
}

/// Producer side of the daemon's queue.
#[derive(Debug, Clone)]
pub struct SwitchHandle {
    tx: mpsc::Sender<SwitchEvent>,
}

impl SwitchHandle {
    /// Queue a snapshot, waiting for room if the queue is full.
    pub async fn submit(
        &self,
        snapshot: FleetSnapshot,
    ) -> Result<(), mpsc::error::SendError<SwitchEvent>> {
        self.tx.send(SwitchEvent::Snapshot(snapshot)).await
    }

    /// Returns `true` once the daemon has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// =============================================================================
// Switch Daemon
// =============================================================================

/// Long-running task that applies snapshots and completions to a
/// [`SwitchController`] and issues the loads it asks for.
pub struct SwitchDaemon {
    controller: SwitchController,
    client: Arc<dyn MapLoadClient>,
    metrics: Arc<SwitchMetrics>,
    events_rx: mpsc::Receiver<SwitchEvent>,
    events_tx: mpsc::WeakSender<SwitchEvent>,
}

impl SwitchDaemon {
    /// Create a daemon and the handle used to feed it snapshots.
    pub fn new(
        config: SwitchDaemonConfig,
        controller: SwitchController,
        client: Arc<dyn MapLoadClient>,
        metrics: Arc<SwitchMetrics>,
    ) -> (Self, SwitchHandle) {
        let (tx, events_rx) = mpsc::channel(config.queue_capacity.max(1));
        let events_tx = tx.downgrade();

        let daemon = Self {
            controller,
            client,
            metrics,
            events_rx,
            events_tx,
        };

        (daemon, SwitchHandle { tx })
    }

    /// Run until shutdown is signalled or the queue closes.
    ///
    /// Returns the controller so callers can inspect its final state.
    pub async fn run(mut self, shutdown: CancellationToken) -> SwitchController {
        info!(
            believed_level = %self.controller.believed_level(),
            levels = self.controller.levels().len(),
            "Switch daemon starting"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Switch daemon shutting down");
                    break;
                }

                event = self.events_rx.recv() => match event {
                    Some(event) => self.handle_event(event, &shutdown).await,
                    None => {
                        info!("Switch daemon queue closed");
                        break;
                    }
                }
            }
        }

        if self.controller.state().in_flight {
            warn!(
                believed_level = %self.controller.believed_level(),
                "Switch daemon stopped with a map load still outstanding"
            );
        }
        info!("Switch daemon stopped");
        self.controller
    }

    async fn handle_event(&mut self, event: SwitchEvent, shutdown: &CancellationToken) {
        match event {
            SwitchEvent::Snapshot(snapshot) => {
                if let Some(request) = self.apply_snapshot(&snapshot) {
                    self.issue(request, shutdown).await;
                }
            }
            SwitchEvent::LoadCompleted(completion) => self.handle_completion(completion),
        }
    }

    /// Run a snapshot through the controller. Returns the load to issue, if any.
    fn apply_snapshot(&mut self, snapshot: &FleetSnapshot) -> Option<LoadRequest> {
        self.metrics.snapshot_received();

        match self.controller.handle_snapshot(snapshot) {
            SnapshotOutcome::Empty => {
                self.metrics.empty_snapshot();
                debug!(fleet = %snapshot.fleet, "No robots in the fleet state message");
                None
            }
            SnapshotOutcome::Unchanged => None,
            SnapshotOutcome::Dropped { reported } => {
                self.metrics.change_dropped();
                debug!(
                    reported = %reported,
                    believed_level = %self.controller.believed_level(),
                    flight_state = self.controller.flight_state().as_str(),
                    "Level change ignored while a map load is in flight"
                );
                None
            }
            SnapshotOutcome::UnknownLevel(e) => {
                self.metrics.level_change();
                self.metrics.unknown_level();
                error!(error = %e, "Cannot switch map");
                None
            }
            SnapshotOutcome::Issue(request) => {
                self.metrics.level_change();
                Some(request)
            }
        }
    }

    async fn issue(&mut self, request: LoadRequest, shutdown: &CancellationToken) {
        self.metrics.load_issued();
        info!(
            request_id = request.id,
            level = %request.level,
            path = %request.path,
            "Trying to load map"
        );

        let load = self.start_load(&request);
        let id = request.id;

        match self.events_tx.upgrade() {
            Some(tx) => {
                tokio::spawn(async move {
                    let result = load.await;
                    // Receiver is gone only after shutdown.
                    let _ = tx
                        .send(SwitchEvent::LoadCompleted(LoadCompletion::new(id, result)))
                        .await;
                });
            }
            None => {
                // No producers left. Everything still queued arrived while
                // this load was in flight, so it is judged before the load
                // completes.
                self.drain_queued();

                tokio::select! {
                    result = load => {
                        self.handle_completion(LoadCompletion::new(id, result));
                    }
                    _ = shutdown.cancelled() => {
                        warn!(request_id = id, "Shutdown while waiting for map load");
                    }
                }
            }
        }
    }

    /// Handle every event already in the queue without waiting for more.
    ///
    /// Only called while a load is in flight, so no snapshot here can issue.
    fn drain_queued(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                SwitchEvent::Snapshot(snapshot) => {
                    if let Some(request) = self.apply_snapshot(&snapshot) {
                        error!(
                            request_id = request.id,
                            level = %request.level,
                            "Load requested while another is in flight"
                        );
                    }
                }
                SwitchEvent::LoadCompleted(completion) => self.handle_completion(completion),
            }
        }
    }

    /// Call the client, turning a panic (when building or polling the load)
    /// into a transport error so the guard is always released.
    fn start_load(&self, request: &LoadRequest) -> BoxFuture<'static, LoadResult> {
        let client = Arc::clone(&self.client);
        let path = request.path.clone();

        match std::panic::catch_unwind(AssertUnwindSafe(|| client.request_load(&path))) {
            Ok(load) => AssertUnwindSafe(load)
                .catch_unwind()
                .map(|outcome| outcome.unwrap_or_else(|panic| panicked(panic.as_ref())))
                .boxed(),
            Err(panic) => future::ready(panicked(panic.as_ref())).boxed(),
        }
    }

    fn handle_completion(&mut self, completion: LoadCompletion) {
        let id = completion.id;

        match self.controller.handle_completion(completion) {
            CompletionOutcome::Loaded { level } => {
                self.metrics.load_succeeded();
                info!(request_id = id, level = %level, "Map loaded successfully");
            }
            CompletionOutcome::Failed { level, status } => {
                self.metrics.load_failed();
                error!(
                    request_id = id,
                    level = %level,
                    code = status.code(),
                    reason = status.describe(),
                    "Failed to load map"
                );
            }
            CompletionOutcome::TransportError { level, reason } => {
                self.metrics.transport_error();
                error!(
                    request_id = id,
                    level = %level,
                    reason = %reason,
                    "Map load request did not complete"
                );
            }
            CompletionOutcome::Stale { id } => {
                self.metrics.stale_completion();
                warn!(request_id = id, "Ignoring completion for a request that is not outstanding");
            }
        }
    }
}

fn panicked(payload: &(dyn Any + Send)) -> LoadResult {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    LoadResult::TransportError(format!("Map-load client panicked: {}", reason))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::RobotState;
    use crate::level::{LevelMap, MapAssetPath};
    use crate::loader::{LoadResult, LoadStatus};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Mock client whose loads complete only when the test says so.
    #[derive(Default)]
    struct ManualClient {
        requested: Mutex<Vec<MapAssetPath>>,
        pending: Mutex<Vec<oneshot::Sender<LoadResult>>>,
    }

    impl ManualClient {
        fn requested(&self) -> Vec<MapAssetPath> {
            self.requested.lock().unwrap().clone()
        }

        fn complete_next(&self, result: LoadResult) {
            let tx = self.pending.lock().unwrap().remove(0);
            tx.send(result).unwrap();
        }
    }

    impl MapLoadClient for ManualClient {
        fn request_load(&self, path: &MapAssetPath) -> BoxFuture<'static, LoadResult> {
            let (tx, rx) = oneshot::channel();
            self.requested.lock().unwrap().push(path.clone());
            self.pending.lock().unwrap().push(tx);
            Box::pin(async move {
                rx.await
                    .unwrap_or_else(|_| LoadResult::TransportError("dropped".to_string()))
            })
        }
    }

    /// Mock client whose first load panics, either while building the
    /// future or while it is polled. Later loads succeed.
    struct PanicOnceClient {
        calls: AtomicUsize,
        in_future: bool,
    }

    impl PanicOnceClient {
        fn new(in_future: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_future,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MapLoadClient for PanicOnceClient {
        fn request_load(&self, _path: &MapAssetPath) -> BoxFuture<'static, LoadResult> {
            let first = self.calls.fetch_add(1, Ordering::SeqCst) == 0;
            if first && !self.in_future {
                panic!("map server client exploded");
            }
            Box::pin(async move {
                if first {
                    panic!("map server response exploded");
                }
                LoadResult::Success
            })
        }
    }

    /// Mock client that answers immediately with a fixed result.
    struct FixedClient(LoadResult);

    impl MapLoadClient for FixedClient {
        fn request_load(&self, _path: &MapAssetPath) -> BoxFuture<'static, LoadResult> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    fn controller() -> SwitchController {
        let levels = LevelMap::new([("L1", "maps/L1.yaml"), ("L2", "maps/L2.yaml")]).unwrap();
        SwitchController::new(levels, "L1")
    }

    fn on_level(level: &str) -> FleetSnapshot {
        FleetSnapshot::new("fleet", vec![RobotState::new("r1", level)])
    }

    /// With the clock paused, the sleep only returns once every task is idle.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_change_issues_one_load() {
        let client = Arc::new(ManualClient::default());
        let metrics = Arc::new(SwitchMetrics::new());
        let (daemon, handle) = SwitchDaemon::new(
            SwitchDaemonConfig::default(),
            controller(),
            client.clone(),
            metrics.clone(),
        );
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(daemon.run(shutdown.clone()));

        handle.submit(on_level("L2")).await.unwrap();
        handle.submit(on_level("L1")).await.unwrap();
        handle.submit(on_level("L2")).await.unwrap();
        settle().await;

        assert_eq!(client.requested(), vec![MapAssetPath::new("maps/L2.yaml")]);

        client.complete_next(LoadResult::Success);
        settle().await;

        shutdown.cancel();
        let controller = task.await.unwrap();

        assert_eq!(controller.believed_level(), "L2");
        assert!(!controller.state().in_flight);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.loads_issued, 1);
        assert_eq!(snapshot.loads_succeeded, 1);
        assert_eq!(snapshot.changes_dropped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_change_after_completion_issues_again() {
        let client = Arc::new(ManualClient::default());
        let (daemon, handle) = SwitchDaemon::new(
            SwitchDaemonConfig::default(),
            controller(),
            client.clone(),
            Arc::new(SwitchMetrics::new()),
        );
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(daemon.run(shutdown.clone()));

        handle.submit(on_level("L2")).await.unwrap();
        settle().await;
        client.complete_next(LoadResult::Failure(LoadStatus(2)));
        settle().await;

        handle.submit(on_level("L1")).await.unwrap();
        settle().await;

        assert_eq!(
            client.requested(),
            vec![
                MapAssetPath::new("maps/L2.yaml"),
                MapAssetPath::new("maps/L1.yaml")
            ]
        );

        client.complete_next(LoadResult::Success);
        settle().await;
        shutdown.cancel();
        let controller = task.await.unwrap();
        assert_eq!(controller.believed_level(), "L1");
    }

    #[tokio::test]
    async fn test_unknown_level_is_counted_not_issued() {
        let client = Arc::new(ManualClient::default());
        let metrics = Arc::new(SwitchMetrics::new());
        let (daemon, handle) = SwitchDaemon::new(
            SwitchDaemonConfig::default(),
            controller(),
            client.clone(),
            metrics.clone(),
        );
        let task = tokio::spawn(daemon.run(CancellationToken::new()));

        handle.submit(on_level("L3")).await.unwrap();
        handle.submit(FleetSnapshot::empty("fleet")).await.unwrap();
        drop(handle);

        let controller = task.await.unwrap();
        assert!(client.requested().is_empty());
        assert!(!controller.state().in_flight);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.unknown_levels, 1);
        assert_eq!(snapshot.empty_snapshots, 1);
        assert_eq!(snapshot.loads_issued, 0);
    }

    #[tokio::test]
    async fn test_daemon_waits_for_outstanding_load_before_closing() {
        let client = Arc::new(FixedClient(LoadResult::TransportError(
            "connection lost".to_string(),
        )));
        let metrics = Arc::new(SwitchMetrics::new());
        let (daemon, handle) = SwitchDaemon::new(
            SwitchDaemonConfig::default(),
            controller(),
            client,
            metrics.clone(),
        );
        let task = tokio::spawn(daemon.run(CancellationToken::new()));

        handle.submit(on_level("L2")).await.unwrap();
        drop(handle);

        let controller = task.await.unwrap();
        assert!(!controller.state().in_flight);
        assert_eq!(metrics.snapshot().transport_errors, 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_daemon() {
        let (daemon, handle) = SwitchDaemon::new(
            SwitchDaemonConfig::default(),
            controller(),
            Arc::new(ManualClient::default()),
            Arc::new(SwitchMetrics::new()),
        );
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(daemon.run(shutdown.clone()));

        shutdown.cancel();
        let controller = task.await.unwrap();
        assert_eq!(controller.believed_level(), "L1");
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_queued_snapshots_judged_in_flight_after_handles_drop() {
        let client = Arc::new(ManualClient::default());
        let metrics = Arc::new(SwitchMetrics::new());
        let (daemon, handle) = SwitchDaemon::new(
            SwitchDaemonConfig::default(),
            controller(),
            client.clone(),
            metrics.clone(),
        );

        handle.submit(on_level("L2")).await.unwrap();
        handle.submit(on_level("L1")).await.unwrap();
        handle.submit(on_level("L2")).await.unwrap();
        drop(handle);

        let task = tokio::spawn(daemon.run(CancellationToken::new()));
        while client.requested().is_empty() {
            tokio::task::yield_now().await;
        }
        client.complete_next(LoadResult::Success);

        let controller = task.await.unwrap();
        assert_eq!(client.requested(), vec![MapAssetPath::new("maps/L2.yaml")]);
        assert_eq!(controller.believed_level(), "L2");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.snapshots_received, 3);
        assert_eq!(snapshot.loads_issued, 1);
        assert_eq!(snapshot.changes_dropped, 1);
        assert_eq!(snapshot.loads_succeeded, 1);
    }

    async fn assert_guard_released_after_panic(in_future: bool) {
        let client = Arc::new(PanicOnceClient::new(in_future));
        let metrics = Arc::new(SwitchMetrics::new());
        let (daemon, handle) = SwitchDaemon::new(
            SwitchDaemonConfig::default(),
            controller(),
            client.clone(),
            metrics.clone(),
        );
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(daemon.run(shutdown.clone()));

        handle.submit(on_level("L2")).await.unwrap();
        settle().await;
        handle.submit(on_level("L1")).await.unwrap();
        settle().await;

        shutdown.cancel();
        let controller = task.await.unwrap();

        assert_eq!(client.calls(), 2);
        assert_eq!(controller.believed_level(), "L1");
        assert!(!controller.state().in_flight);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.transport_errors, 1);
        assert_eq!(snapshot.loads_succeeded, 1);
        assert_eq!(snapshot.changes_dropped, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_load_future_releases_guard() {
        assert_guard_released_after_panic(true).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_request_load_releases_guard() {
        assert_guard_released_after_panic(false).await;
    }
}
