//! Per-result processing: audit append, sink routing and broadcast fan-out
//! issued concurrently, none depending on another's success.

use std::sync::Arc;

use broadcaster::EventHub;
use contracts::{
    AlertSink, DetectionResult, GovernanceRecord, PipelineError, ResultEvent, SignedEntry,
};
use dispatcher::{RouteOutcome, Router};
use governance::GovernanceLog;
use observability::{
    record_audit_append, record_event_fanout, record_result_processed, record_sink_attempt,
};
use tracing::instrument;

/// What happened to one result across the three consumers
pub struct ProcessedResult {
    pub outcome: RouteOutcome,
    /// Subscriber queues the event reached
    pub fanout: usize,
    pub entry: SignedEntry,
}

/// Drives one detection result through routing, audit and broadcast
///
/// The audit append runs unconditionally for every result, regardless of
/// whether the alert fired and regardless of sink outcomes. Each result is
/// atomic with respect to the audit log; ordering between concurrently
/// submitted results is not guaranteed beyond that.
pub struct ResultsProcessor<B, T, W> {
    governance: Arc<GovernanceLog>,
    router: Arc<Router<B, T, W>>,
    hub: Arc<EventHub>,
    threshold: f32,
}

impl<B, T, W> ResultsProcessor<B, T, W>
where
    B: AlertSink + Sync + Send,
    T: AlertSink + Sync + Send,
    W: AlertSink + Sync + Send,
{
    pub fn new(
        governance: Arc<GovernanceLog>,
        router: Arc<Router<B, T, W>>,
        hub: Arc<EventHub>,
        threshold: f32,
    ) -> Self {
        Self {
            governance,
            router,
            hub,
            threshold,
        }
    }

    /// Process one result
    ///
    /// Returns an error only when the audit append fails; routing and
    /// broadcast have still run by then, and the caller decides whether to
    /// alert on the lost durability.
    #[instrument(name = "process_result", skip_all, fields(frame_id = result.frame_id))]
    pub async fn process(&self, result: &DetectionResult) -> Result<ProcessedResult, PipelineError> {
        let record = GovernanceRecord::from_result(result, self.threshold);
        let event = ResultEvent::from_result(result);

        let governance = Arc::clone(&self.governance);
        let audit_task = tokio::task::spawn_blocking(move || governance.append(&record));

        let (outcome, fanout, audit) = tokio::join!(
            self.router.route(result, self.threshold),
            async { self.hub.publish(&event) },
            audit_task,
        );

        record_result_processed(result.frame_id, result.detections.len(), outcome.fired);
        for attempt in &outcome.attempts {
            record_sink_attempt(&attempt.sink, attempt.delivered);
        }
        record_event_fanout(fanout);

        let entry = audit
            .map_err(|e| PipelineError::Other(format!("audit task failed: {e}")))??;
        record_audit_append(result.latency_ms);

        Ok(ProcessedResult {
            outcome,
            fanout,
            entry,
        })
    }
}
