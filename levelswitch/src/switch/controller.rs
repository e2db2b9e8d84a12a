//! Level-switch state machine.
//!
//! The controller decides, it does not act: [`SwitchController::handle_snapshot`]
//! returns a [`LoadRequest`] for the caller to issue, and the caller reports
//! the result back via [`SwitchController::handle_completion`]. Keeping the
//! I/O outside makes every transition a plain synchronous call.
//!
//! `believed_level` is updated as soon as a change is accepted, before the
//! map server confirms the load. A failed load (or an unknown level) leaves
//! the controller believing a level whose map is not loaded; the next
//! snapshot on a *different* level is what triggers the next attempt.

use crate::fleet::FleetSnapshot;
use crate::level::{LevelMap, LevelMapError, LevelMonitor, MapAssetPath, Observation};
use crate::loader::{LoadResult, LoadStatus};

use super::guard::{FlightState, SingleFlightGuard};

/// Identifier of an issued load request, unique per controller.
pub type RequestId = u64;

/// A load the controller wants issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: RequestId,
    pub level: String,
    pub path: MapAssetPath,
}

/// Result of an issued load, reported back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCompletion {
    pub id: RequestId,
    pub result: LoadResult,
}

impl LoadCompletion {
    pub fn new(id: RequestId, result: LoadResult) -> Self {
        Self { id, result }
    }
}

/// What the controller did with a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// No robots reported.
    Empty,
    /// Lead robot is on the believed level.
    Unchanged,
    /// Level differs but a load is in flight; the change is discarded.
    Dropped { reported: String },
    /// Level differs but has no configured map. No request was issued.
    UnknownLevel(LevelMapError),
    /// A load must be issued.
    Issue(LoadRequest),
}

/// What the controller did with a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The map server loaded the level's map.
    Loaded { level: String },
    /// The map server rejected the load.
    Failed { level: String, status: LoadStatus },
    /// The load call did not complete normally.
    TransportError { level: String, reason: String },
    /// Completion did not match the outstanding request and was ignored.
    Stale { id: RequestId },
}

/// Point-in-time copy of the controller's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    pub believed_level: String,
    pub in_flight: bool,
}

#[derive(Debug, Clone)]
struct Outstanding {
    id: RequestId,
    level: String,
}

/// Orchestrates level detection, guarding and load reconciliation.
///
/// # Example
///
/// ```
/// use levelswitch::fleet::{FleetSnapshot, RobotState};
/// use levelswitch::level::LevelMap;
/// use levelswitch::loader::LoadResult;
/// use levelswitch::switch::{LoadCompletion, SnapshotOutcome, SwitchController};
///
/// let levels = LevelMap::new([("L1", "L1.yaml"), ("L2", "L2.yaml")]).unwrap();
/// let mut controller = SwitchController::new(levels, "L1");
///
/// let snapshot = FleetSnapshot::new("fleet", vec![RobotState::new("r1", "L2")]);
/// let SnapshotOutcome::Issue(request) = controller.handle_snapshot(&snapshot) else {
///     panic!("expected a load request");
/// };
/// assert_eq!(request.path.as_str(), "L2.yaml");
///
/// controller.handle_completion(LoadCompletion::new(request.id, LoadResult::Success));
/// assert!(!controller.state().in_flight);
/// ```
#[derive(Debug)]
pub struct SwitchController {
    levels: LevelMap,
    monitor: LevelMonitor,
    guard: SingleFlightGuard,
    believed_level: String,
    outstanding: Option<Outstanding>,
    next_id: RequestId,
}

impl SwitchController {
    /// Create a controller that initially believes `default_level` is loaded.
    pub fn new(levels: LevelMap, default_level: impl Into<String>) -> Self {
        Self {
            levels,
            monitor: LevelMonitor::new(),
            guard: SingleFlightGuard::new(),
            believed_level: default_level.into(),
            outstanding: None,
            next_id: 1,
        }
    }

    /// Process one fleet snapshot.
    pub fn handle_snapshot(&mut self, snapshot: &FleetSnapshot) -> SnapshotOutcome {
        let observation =
            self.monitor
                .classify(snapshot, &self.believed_level, self.guard.is_in_flight());

        let event = match observation {
            Observation::Empty => return SnapshotOutcome::Empty,
            Observation::Unchanged => return SnapshotOutcome::Unchanged,
            Observation::Dropped { reported } => return SnapshotOutcome::Dropped { reported },
            Observation::Changed(event) => event,
        };

        self.believed_level = event.new_level.clone();

        let path = match self.levels.resolve(&event.new_level) {
            Ok(path) => path.clone(),
            Err(e) => return SnapshotOutcome::UnknownLevel(e),
        };

        // Always succeeds: the monitor only fires while idle.
        if !self.guard.try_acquire() {
            return SnapshotOutcome::Dropped {
                reported: event.new_level,
            };
        }

        let id = self.next_id;
        self.next_id += 1;
        self.outstanding = Some(Outstanding {
            id,
            level: event.new_level.clone(),
        });

        SnapshotOutcome::Issue(LoadRequest {
            id,
            level: event.new_level,
            path,
        })
    }

    /// Process the result of an issued load and return to idle.
    pub fn handle_completion(&mut self, completion: LoadCompletion) -> CompletionOutcome {
        let level = match self.outstanding.take() {
            Some(outstanding) if outstanding.id == completion.id => outstanding.level,
            other => {
                self.outstanding = other;
                return CompletionOutcome::Stale { id: completion.id };
            }
        };

        self.guard.release();

        match completion.result {
            LoadResult::Success => CompletionOutcome::Loaded { level },
            LoadResult::Failure(status) => CompletionOutcome::Failed { level, status },
            LoadResult::TransportError(reason) => {
                CompletionOutcome::TransportError { level, reason }
            }
        }
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            believed_level: self.believed_level.clone(),
            in_flight: self.guard.is_in_flight(),
        }
    }

    pub fn believed_level(&self) -> &str {
        &self.believed_level
    }

    pub fn flight_state(&self) -> FlightState {
        self.guard.state()
    }

    pub fn levels(&self) -> &LevelMap {
        &self.levels
    }
}
