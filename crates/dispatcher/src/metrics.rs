//! Router metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Delivery counters for a single sink
#[derive(Debug, Default)]
pub struct SinkStats {
    attempted: AtomicU64,
    delivered: AtomicU64,
}

impl SinkStats {
    pub fn attempted(&self) -> u64 {
        self.attempted.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.attempted() - self.delivered()
    }

    pub fn record(&self, delivered: bool) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        if delivered {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Metrics for the dispatch router
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Results evaluated
    results_received: AtomicU64,
    /// Results whose detections crossed the threshold
    alerts_fired: AtomicU64,
    pub message_bus: SinkStats,
    pub tag_write: SinkStats,
    pub webhook: SinkStats,
}

impl RouterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results_received(&self) -> u64 {
        self.results_received.load(Ordering::Relaxed)
    }

    pub fn inc_results_received(&self) {
        self.results_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn alerts_fired(&self) -> u64 {
        self.alerts_fired.load(Ordering::Relaxed)
    }

    pub fn inc_alerts_fired(&self) {
        self.alerts_fired.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> RouterMetricsSnapshot {
        RouterMetricsSnapshot {
            results_received: self.results_received(),
            alerts_fired: self.alerts_fired(),
            message_bus_delivered: self.message_bus.delivered(),
            message_bus_failed: self.message_bus.failed(),
            tag_write_delivered: self.tag_write.delivered(),
            tag_write_failed: self.tag_write.failed(),
            webhook_delivered: self.webhook.delivered(),
            webhook_failed: self.webhook.failed(),
        }
    }
}

/// Snapshot of router metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterMetricsSnapshot {
    pub results_received: u64,
    pub alerts_fired: u64,
    pub message_bus_delivered: u64,
    pub message_bus_failed: u64,
    pub tag_write_delivered: u64,
    pub tag_write_failed: u64,
    pub webhook_delivered: u64,
    pub webhook_failed: u64,
}
