//! Level-change detection.
//!
//! The monitor inspects the **first** robot of a snapshot only. Fleets split
//! across levels are not reconciled: whichever robot the fleet manager lists
//! first decides the level.

use crate::fleet::FleetSnapshot;

/// A detected move of the fleet to a different level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChangeEvent {
    pub new_level: String,
}

/// Why a snapshot did or did not produce a level change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The snapshot had no robots.
    Empty,
    /// The lead robot is on the level already believed current.
    Unchanged,
    /// The level differs but a load is in flight; the change is discarded.
    Dropped { reported: String },
    /// The fleet moved to a new level.
    Changed(LevelChangeEvent),
}

impl Observation {
    /// Convert to the change event, if any.
    pub fn into_event(self) -> Option<LevelChangeEvent> {
        match self {
            Observation::Changed(event) => Some(event),
            _ => None,
        }
    }
}

/// Stateless level-change detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelMonitor;

impl LevelMonitor {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `snapshot` should trigger a level switch.
    ///
    /// Returns an event only when the lead robot's level differs from
    /// `believed_level` and no load is in flight.
    pub fn observe(
        &self,
        snapshot: &FleetSnapshot,
        believed_level: &str,
        in_flight: bool,
    ) -> Option<LevelChangeEvent> {
        self.classify(snapshot, believed_level, in_flight)
            .into_event()
    }

    /// Like [`observe`](Self::observe), but also reports why no event fired.
    pub fn classify(
        &self,
        snapshot: &FleetSnapshot,
        believed_level: &str,
        in_flight: bool,
    ) -> Observation {
        let Some(reported) = snapshot.lead_level() else {
            return Observation::Empty;
        };

        if reported == believed_level {
            Observation::Unchanged
        } else if in_flight {
            Observation::Dropped {
                reported: reported.to_string(),
            }
        } else {
            Observation::Changed(LevelChangeEvent {
                new_level: reported.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::RobotState;

    fn snapshot(levels: &[&str]) -> FleetSnapshot {
        let robots = levels
            .iter()
            .enumerate()
            .map(|(i, level)| RobotState::new(format!("r{}", i), *level))
            .collect();
        FleetSnapshot::new("fleet", robots)
    }

    #[test]
    fn test_empty_snapshot_is_ignored() {
        let monitor = LevelMonitor::new();
        assert_eq!(
            monitor.classify(&snapshot(&[]), "L1", false),
            Observation::Empty
        );
        assert_eq!(monitor.observe(&snapshot(&[]), "L1", false), None);
    }

    #[test]
    fn test_same_level_is_unchanged() {
        let monitor = LevelMonitor::new();
        assert_eq!(
            monitor.classify(&snapshot(&["L1"]), "L1", false),
            Observation::Unchanged
        );
    }

    #[test]
    fn test_different_level_fires_when_idle() {
        let monitor = LevelMonitor::new();
        assert_eq!(
            monitor.observe(&snapshot(&["L2"]), "L1", false),
            Some(LevelChangeEvent {
                new_level: "L2".to_string()
            })
        );
    }

    #[test]
    fn test_different_level_dropped_when_in_flight() {
        let monitor = LevelMonitor::new();
        assert_eq!(
            monitor.classify(&snapshot(&["L2"]), "L1", true),
            Observation::Dropped {
                reported: "L2".to_string()
            }
        );
        assert_eq!(monitor.observe(&snapshot(&["L2"]), "L1", true), None);
    }

    #[test]
    fn test_only_first_robot_counts() {
        let monitor = LevelMonitor::new();
        // Second robot is elsewhere, but the lead robot matches.
        assert_eq!(monitor.observe(&snapshot(&["L1", "L2"]), "L1", false), None);
        // Lead robot moved, the rest did not.
        assert!(monitor
            .observe(&snapshot(&["L2", "L1", "L1"]), "L1", false)
            .is_some());
    }
}
