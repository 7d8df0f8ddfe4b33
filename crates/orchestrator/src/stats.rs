use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for the evaluation scheduler.
///
/// Updated concurrently by evaluation tasks; read with [`SchedulerStats::snapshot`].
#[derive(Debug, Default)]
pub struct SchedulerStats {
    ticks: AtomicU64,
    evaluations: AtomicU64,
    entries_emitted: AtomicU64,
    exits_emitted: AtomicU64,
    risk_denials: AtomicU64,
    evaluation_failures: AtomicU64,
}

/// Point-in-time copy of [`SchedulerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatsSnapshot {
    pub ticks: u64,
    pub evaluations: u64,
    pub entries_emitted: u64,
    pub exits_emitted: u64,
    pub risk_denials: u64,
    pub evaluation_failures: u64,
}

impl SchedulerStats {
    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_entry(&self) {
        self.entries_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exit(&self) {
        self.exits_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_denial(&self) {
        self.risk_denials.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.evaluation_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> SchedulerStatsSnapshot {
        SchedulerStatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            evaluations: self.evaluations.load(Ordering::Relaxed),
            entries_emitted: self.entries_emitted.load(Ordering::Relaxed),
            exits_emitted: self.exits_emitted.load(Ordering::Relaxed),
            risk_denials: self.risk_denials.load(Ordering::Relaxed),
            evaluation_failures: self.evaluation_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let stats = SchedulerStats::default();
        stats.record_tick();
        stats.record_evaluation();
        stats.record_evaluation();
        stats.record_entry();
        stats.record_denial();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.ticks, 1);
        assert_eq!(snapshot.evaluations, 2);
        assert_eq!(snapshot.entries_emitted, 1);
        assert_eq!(snapshot.exits_emitted, 0);
        assert_eq!(snapshot.risk_denials, 1);
        assert_eq!(snapshot.evaluation_failures, 0);
    }
}
