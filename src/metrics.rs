use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing store activity.
#[derive(Default)]
pub struct StoreMetrics {
    generated: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl StoreMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name handed out by `generate`.
    pub fn record_generated(&self) {
        self.generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a validation.
    pub fn record_validation(&self, accepted: bool) {
        let counter = if accepted {
            &self.accepted
        } else {
            &self.rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            generated: self.generated.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of store counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Names generated since startup.
    pub generated: u64,
    /// Validations that produced no reasons.
    pub accepted: u64,
    /// Validations that produced at least one reason.
    pub rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_generation_and_validation_outcomes() {
        let metrics = StoreMetrics::new();
        metrics.record_generated();
        metrics.record_validation(true);
        metrics.record_validation(false);
        metrics.record_validation(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.generated, 1);
        assert_eq!(snapshot.accepted, 1);
        assert_eq!(snapshot.rejected, 2);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = StoreMetrics::new();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                generated: 0,
                accepted: 0,
                rejected: 0,
            }
        );
    }
}
