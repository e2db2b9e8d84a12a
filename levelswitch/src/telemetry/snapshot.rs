//! Point-in-time copy of switcher counters.

use std::fmt;

/// Plain copy of [`SwitchMetrics`](super::SwitchMetrics) counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub snapshots_received: u64,
    pub empty_snapshots: u64,
    pub level_changes: u64,
    pub changes_dropped: u64,
    pub unknown_levels: u64,
    pub loads_issued: u64,
    pub loads_succeeded: u64,
    pub loads_failed: u64,
    pub transport_errors: u64,
    pub stale_completions: u64,
}

impl TelemetrySnapshot {
    /// Loads issued but not yet completed (0 or 1 in normal operation).
    pub fn loads_outstanding(&self) -> u64 {
        self.loads_issued
            .saturating_sub(self.loads_succeeded + self.loads_failed + self.transport_errors)
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Snapshots received:   {}", self.snapshots_received)?;
        writeln!(f, "  empty:              {}", self.empty_snapshots)?;
        writeln!(f, "Level changes:        {}", self.level_changes)?;
        writeln!(f, "  dropped in flight:  {}", self.changes_dropped)?;
        writeln!(f, "  unknown level:      {}", self.unknown_levels)?;
        writeln!(f, "Loads issued:         {}", self.loads_issued)?;
        writeln!(f, "  succeeded:          {}", self.loads_succeeded)?;
        writeln!(f, "  failed:             {}", self.loads_failed)?;
        writeln!(f, "  transport errors:   {}", self.transport_errors)?;
        write!(f, "Stale completions:    {}", self.stale_completions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outstanding_loads() {
        let snapshot = TelemetrySnapshot {
            loads_issued: 3,
            loads_succeeded: 1,
            loads_failed: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.loads_outstanding(), 1);
    }

    #[test]
    fn test_display_lists_counters() {
        let snapshot = TelemetrySnapshot {
            loads_issued: 4,
            stale_completions: 2,
            ..Default::default()
        };
        let text = snapshot.to_string();
        assert!(text.contains("Loads issued:         4"));
        assert!(text.contains("transport errors"));
        assert!(text.contains("Stale completions:    2"));
    }
}
