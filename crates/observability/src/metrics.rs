//! Results-path metric recording
//!
//! Helpers invoked by the orchestrator as each detection result flows
//! through routing, audit and broadcast.

use metrics::{counter, gauge, histogram};

/// Record one processed detection result
///
/// Called once per result, after routing.
pub fn record_result_processed(frame_id: u64, num_detections: usize, fired: bool) {
    counter!("edgesight_results_processed_total").increment(1);
    gauge!("edgesight_last_frame_id").set(frame_id as f64);
    histogram!("edgesight_detections_per_result").record(num_detections as f64);

    if fired {
        counter!("edgesight_results_fired_total").increment(1);
    }
}

/// Record one sink delivery attempt
pub fn record_sink_attempt(sink_name: &str, delivered: bool) {
    let status = if delivered { "delivered" } else { "failed" };
    counter!(
        "edgesight_sink_deliveries_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record an audit append with its observed end-to-end latency
pub fn record_audit_append(latency_ms: Option<f64>) {
    counter!("edgesight_audit_appends_total").increment(1);
    if let Some(latency) = latency_ms {
        histogram!("edgesight_result_latency_ms").record(latency);
    }
}

/// Record one broadcast fan-out
pub fn record_event_fanout(subscribers: usize) {
    counter!("edgesight_event_fanouts_total").increment(1);
    gauge!("edgesight_event_fanout_size").set(subscribers as f64);
}
