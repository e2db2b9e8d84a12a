//! Fleet-state model and snapshot sources.
//!
//! A [`FleetSnapshot`] is one batch of robot locations reported at a point in
//! time. Snapshots are independent of each other; nothing here tracks robot
//! identity across snapshots.
//!
//! # Wire Format
//!
//! Fleet states arrive as newline-delimited JSON, one message per line:
//!
//! ```text
//! {"name": "pinklab", "robots": [{"name": "r1", "location": {"level_name": "L2"}}]}
//! ```
//!
//! [`SnapshotReader`] turns any async byte stream of such lines into
//! snapshots, skipping blank and malformed lines.

mod model;
mod source;

pub use model::{FleetSnapshot, FleetStateMessage, RobotLocation, RobotMessage, RobotState};
pub use source::{SnapshotReader, SourceError};
