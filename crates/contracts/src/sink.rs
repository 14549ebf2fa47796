//! AlertSink trait - Dispatch Router output interface
//!
//! Defines the abstract interface for alert sinks.

use crate::DetectionResult;

/// Alert delivery trait
///
/// All sink implementations must implement this trait. A sink owns its
/// transport and swallows its own transport-level failures: `attempt`
/// reports delivery as a boolean so the router can count outcomes without
/// one sink's failure propagating to another.
#[trait_variant::make(AlertSink: Send)]
pub trait LocalAlertSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Whether this sink is enabled by configuration
    fn enabled(&self) -> bool;

    /// Attempt to deliver the alert payload to `target`
    ///
    /// Returns `true` only on confirmed delivery. Must not panic and must
    /// bound its own wait time so a hung endpoint cannot starve other sinks.
    async fn attempt(&self, target: &str, result: &DetectionResult) -> bool;
}
