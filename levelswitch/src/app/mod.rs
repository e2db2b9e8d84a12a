//! Application bootstrap and lifecycle management.
//!
//! [`LevelSwitchApp`] wires the pieces in the right order:
//!
//! 1. Build the map-load client and (optionally) wait for the map server
//! 2. Build the controller from the validated level table
//! 3. Spawn the switch daemon and hand out a [`SwitchHandle`](crate::switch::SwitchHandle)
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      LevelSwitchApp                        │
//! │                                                            │
//! │  AppConfig ──► LevelMap ──► SwitchController ─┐            │
//! │                                               ▼            │
//! │  HttpMapLoadClient ─────────────────────► SwitchDaemon     │
//! │                                               │            │
//! │  SwitchHandle ◄───────────────────────────────┘            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use levelswitch::app::{AppConfig, LevelSwitchApp};
//!
//! let app = LevelSwitchApp::start(config, shutdown.clone()).await?;
//! let handle = app.handle();
//!
//! // ... feed snapshots through `handle` ...
//!
//! let controller = app.shutdown().await?;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{load_once, LevelSwitchApp};
pub use config::{AppConfig, MapServerConfig};
pub use error::AppError;
