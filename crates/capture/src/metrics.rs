//! Capture edge metrics

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Metrics for one capture session
#[derive(Debug, Default)]
pub struct CaptureMetrics {
    /// Frames acquired from the source
    frames_captured: AtomicU64,
    /// Frames successfully handed to the transform stage
    frames_sent: AtomicU64,
    /// Frames lost to buffer eviction or acquisition errors
    frames_dropped: AtomicU64,
    /// Failed delivery attempts
    send_failures: AtomicU64,
    /// Whether the worker loop is currently running
    running: AtomicBool,
}

impl CaptureMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured.load(Ordering::Relaxed)
    }

    pub fn inc_frames_captured(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    pub fn inc_frames_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    pub fn add_frames_dropped(&self, n: u64) {
        if n > 0 {
            self.frames_dropped.fetch_add(n, Ordering::Relaxed);
        }
    }

    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        metrics::gauge!("edgesight_capture_running").set(if running { 1.0 } else { 0.0 });
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CaptureMetricsSnapshot {
        CaptureMetricsSnapshot {
            frames_captured: self.frames_captured(),
            frames_sent: self.frames_sent(),
            frames_dropped: self.frames_dropped(),
            send_failures: self.send_failures(),
            running: self.is_running(),
        }
    }
}

/// Snapshot of capture metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureMetricsSnapshot {
    pub frames_captured: u64,
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub send_failures: u64,
    pub running: bool,
}
