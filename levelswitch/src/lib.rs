//! levelswitch - Fleet level tracking for a shared map server
//!
//! This library watches fleet-state reports from mobile robots and, when the
//! fleet moves to a different level (floor, building section), asks the map
//! server to load that level's map. At most one load request is outstanding
//! at any time, and a level the switcher already believes is current never
//! triggers a second load.
//!
//! # Architecture
//!
//! ```text
//! FleetSnapshot ──► LevelMonitor ──► SwitchController ──► MapLoadClient
//!                                        ▲      │
//!                                        │      ▼
//!                         LoadCompleted ─┴── SwitchDaemon queue
//! ```
//!
//! - [`level`]: level → map asset table and change detection
//! - [`switch`]: single-flight guard, controller state machine, daemon
//! - [`loader`]: map-load client trait, result types, HTTP adapter
//! - [`fleet`]: fleet-state model and newline-delimited JSON source
//! - [`app`]: application bootstrap tying the pieces together

pub mod app;
pub mod config;
pub mod fleet;
pub mod level;
pub mod loader;
pub mod logging;
pub mod switch;
pub mod telemetry;

/// Library version, from Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
