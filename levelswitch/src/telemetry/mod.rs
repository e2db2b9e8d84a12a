//! Switcher telemetry for observability and operator feedback.
//!
//! Lock-free atomic counters updated by the switch daemon, plus a plain
//! point-in-time copy for display.
//!
//! # Architecture
//!
//! ```text
//! SwitchDaemon ─────► SwitchMetrics ─────► TelemetrySnapshot ─────► CLI summary
//!                     (atomic counters)    (point-in-time copy)
//! ```
//!
//! # Example
//!
//! ```
//! use levelswitch::telemetry::SwitchMetrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(SwitchMetrics::new());
//! metrics.snapshot_received();
//! metrics.load_issued();
//! metrics.load_succeeded();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.loads_issued, 1);
//! assert_eq!(snapshot.loads_outstanding(), 0);
//! ```

mod metrics;
mod snapshot;

pub use metrics::SwitchMetrics;
pub use snapshot::TelemetrySnapshot;
