//! Atomic switcher counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::TelemetrySnapshot;

/// Counters shared between the switch daemon and observers.
#[derive(Debug, Default)]
pub struct SwitchMetrics {
    snapshots_received: AtomicU64,
    empty_snapshots: AtomicU64,
    level_changes: AtomicU64,
    changes_dropped: AtomicU64,
    unknown_levels: AtomicU64,
    loads_issued: AtomicU64,
    loads_succeeded: AtomicU64,
    loads_failed: AtomicU64,
    transport_errors: AtomicU64,
    stale_completions: AtomicU64,
}

impl SwitchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot_received(&self) {
        self.snapshots_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn empty_snapshot(&self) {
        self.empty_snapshots.fetch_add(1, Ordering::Relaxed);
    }

    pub fn level_change(&self) {
        self.level_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn change_dropped(&self) {
        self.changes_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unknown_level(&self) {
        self.unknown_levels.fetch_add(1, Ordering::Relaxed);
    }

    pub fn load_issued(&self) {
        self.loads_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn load_succeeded(&self) {
        self.loads_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn load_failed(&self) {
        self.loads_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale_completion(&self) {
        self.stale_completions.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            snapshots_received: self.snapshots_received.load(Ordering::Relaxed),
            empty_snapshots: self.empty_snapshots.load(Ordering::Relaxed),
            level_changes: self.level_changes.load(Ordering::Relaxed),
            changes_dropped: self.changes_dropped.load(Ordering::Relaxed),
            unknown_levels: self.unknown_levels.load(Ordering::Relaxed),
            loads_issued: self.loads_issued.load(Ordering::Relaxed),
            loads_succeeded: self.loads_succeeded.load(Ordering::Relaxed),
            loads_failed: self.loads_failed.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            stale_completions: self.stale_completions.load(Ordering::Relaxed),
        }
    }
}
