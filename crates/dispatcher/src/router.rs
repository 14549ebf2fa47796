//! Dispatch router - per-result alert decision and isolated fan-out
//!
//! Evaluates each detection result against the alert threshold and, when it
//! fires, invokes every enabled sink in fixed order (message bus, tag write,
//! webhook). Sink calls are independent: a failure is counted and never
//! suppresses the remaining sinks, and the audit append performed by the
//! caller is unconditional either way.

use std::sync::Arc;

use contracts::{AlertSink, DetectionResult};
use metrics::counter;
use tracing::{debug, info, instrument};

use crate::metrics::{RouterMetrics, SinkStats};

/// Per-sink delivery targets, derived from configuration
#[derive(Debug, Clone)]
pub struct RouteTargets {
    /// Message bus topic
    pub topic: String,
    /// Tag server address (line identifier)
    pub tag_target: String,
    /// Webhook URL, empty when unset
    pub webhook_url: String,
}

impl RouteTargets {
    /// Standard targets for an inspection line
    pub fn for_line(line_id: &str, webhook_url: Option<&str>) -> Self {
        Self {
            topic: format!("edgesight/line/{line_id}/defect"),
            tag_target: line_id.to_string(),
            webhook_url: webhook_url.unwrap_or_default().to_string(),
        }
    }
}

/// One sink invocation outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkAttempt {
    pub sink: String,
    pub delivered: bool,
}

/// Outcome of routing one result
#[derive(Debug, Clone, Default)]
pub struct RouteOutcome {
    /// Whether any detection crossed the threshold
    pub fired: bool,
    /// Sink invocations, in invocation order (empty when not fired)
    pub attempts: Vec<SinkAttempt>,
}

/// The dispatch router
///
/// Generic over its sink types so tests can inject mocks; production wiring
/// uses `MqttSink`/`TagSink`/`WebhookSink`.
pub struct Router<B, T, W> {
    targets: RouteTargets,
    message_bus: B,
    tag_write: T,
    webhook: W,
    metrics: Arc<RouterMetrics>,
}

impl<B, T, W> Router<B, T, W>
where
    B: AlertSink + Sync,
    T: AlertSink + Sync,
    W: AlertSink + Sync,
{
    /// Create a router over the three sinks
    pub fn new(targets: RouteTargets, message_bus: B, tag_write: T, webhook: W) -> Self {
        Self {
            targets,
            message_bus,
            tag_write,
            webhook,
            metrics: Arc::new(RouterMetrics::new()),
        }
    }

    /// Router metrics
    pub fn metrics(&self) -> Arc<RouterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Evaluate one result and fan out to enabled sinks when it fires
    ///
    /// Sink order is fixed but not a correctness dependency; each sink
    /// swallows its own failures, so partial delivery leaves the remaining
    /// sinks and the caller's audit append unaffected.
    #[instrument(
        name = "router_route",
        skip(self, result),
        fields(frame_id = result.frame_id, threshold)
    )]
    pub async fn route(&self, result: &DetectionResult, threshold: f32) -> RouteOutcome {
        self.metrics.inc_results_received();
        counter!("edgesight_results_received_total").increment(1);

        let fired = result.fires_at(threshold);
        let mut outcome = RouteOutcome {
            fired,
            attempts: Vec::new(),
        };

        if !fired {
            debug!(frame_id = result.frame_id, "below threshold, no sinks invoked");
            return outcome;
        }

        self.metrics.inc_alerts_fired();
        counter!("edgesight_alerts_fired_total").increment(1);
        info!(
            frame_id = result.frame_id,
            detections = result.detections.len(),
            "alert fired"
        );

        if self.message_bus.enabled() {
            let delivered = self.message_bus.attempt(&self.targets.topic, result).await;
            record_attempt(
                &mut outcome,
                &self.metrics.message_bus,
                self.message_bus.name(),
                delivered,
            );
        }

        if self.tag_write.enabled() {
            let delivered = self.tag_write.attempt(&self.targets.tag_target, result).await;
            record_attempt(
                &mut outcome,
                &self.metrics.tag_write,
                self.tag_write.name(),
                delivered,
            );
        }

        if self.webhook.enabled() {
            let delivered = self.webhook.attempt(&self.targets.webhook_url, result).await;
            record_attempt(
                &mut outcome,
                &self.metrics.webhook,
                self.webhook.name(),
                delivered,
            );
        }

        outcome
    }
}

fn record_attempt(outcome: &mut RouteOutcome, stats: &SinkStats, sink: &str, delivered: bool) {
    stats.record(delivered);
    counter!(
        "edgesight_sink_attempts_total",
        "sink" => sink.to_string(),
        "status" => if delivered { "delivered" } else { "failed" }
    )
    .increment(1);
    outcome.attempts.push(SinkAttempt {
        sink: sink.to_string(),
        delivered,
    });
}
