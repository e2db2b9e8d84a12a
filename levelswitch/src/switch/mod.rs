//! Level switching: single-flight guard, controller and daemon.
//!
//! # State Machine
//!
//! ```text
//! Idle --[snapshot on new level, path resolved]--> RequestInFlight
//! Idle --[snapshot on new level, unknown level]--> Idle (error reported)
//! RequestInFlight --[snapshot]--> RequestInFlight (change dropped)
//! RequestInFlight --[load completed]--> Idle
//! ```
//!
//! [`SwitchController`] holds the state machine and performs no I/O.
//! [`SwitchDaemon`] owns the controller on a single task, issues the loads
//! the controller asks for, and feeds their completions back through the
//! same queue that carries snapshots, so the controller never sees two
//! events at once.

mod controller;
mod daemon;
mod guard;

pub use controller::{
    CompletionOutcome, ControllerState, LoadCompletion, LoadRequest, RequestId, SnapshotOutcome,
    SwitchController,
};
pub use daemon::{
    SwitchDaemon, SwitchDaemonConfig, SwitchEvent, SwitchHandle, DEFAULT_QUEUE_CAPACITY,
};
pub use guard::{FlightState, SingleFlightGuard};
