//! Core data types for fleet snapshots.
//!
//! The domain types ([`RobotState`], [`FleetSnapshot`]) are decoupled from the
//! wire types ([`FleetStateMessage`] and friends). The wire types mirror the
//! fleet manager's JSON shape and are converted on arrival.

use serde::{Deserialize, Serialize};

/// One robot's reported location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RobotState {
    /// Robot identifier as reported by the fleet manager.
    pub id: String,
    /// Level the robot is currently on (e.g., "L1").
    pub level: String,
}

impl RobotState {
    /// Create a new robot state.
    pub fn new(id: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: level.into(),
        }
    }
}

/// One reported batch of robot locations.
///
/// Robot order is preserved from the wire message. Level-change detection
/// only looks at the first robot, so order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetSnapshot {
    /// Fleet name (informational).
    pub fleet: String,
    /// Robots in reported order. May be empty.
    pub robots: Vec<RobotState>,
}

impl FleetSnapshot {
    /// Create a snapshot from a fleet name and robot list.
    pub fn new(fleet: impl Into<String>, robots: Vec<RobotState>) -> Self {
        Self {
            fleet: fleet.into(),
            robots,
        }
    }

    /// Create a snapshot with no robots.
    pub fn empty(fleet: impl Into<String>) -> Self {
        Self::new(fleet, Vec::new())
    }

    /// Returns `true` if no robots were reported.
    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    /// Number of robots in the snapshot.
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    /// Level of the first reported robot, if any.
    pub fn lead_level(&self) -> Option<&str> {
        self.robots.first().map(|robot| robot.level.as_str())
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Fleet-state message as published by the fleet manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetStateMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub robots: Vec<RobotMessage>,
}

/// Per-robot entry of a [`FleetStateMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotMessage {
    pub name: String,
    pub location: RobotLocation,
}

/// Location part of a [`RobotMessage`]. Only the level is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotLocation {
    pub level_name: String,
}

impl From<FleetStateMessage> for FleetSnapshot {
    fn from(message: FleetStateMessage) -> Self {
        let robots = message
            .robots
            .into_iter()
            .map(|robot| RobotState::new(robot.name, robot.location.level_name))
            .collect();
        FleetSnapshot::new(message.name, robots)
    }
}
