//! Pipeline statistics and summary reporting.

use std::time::Duration;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames acquired by the capture session
    pub frames_captured: u64,

    /// Frames delivered to the transform stage
    pub frames_sent: u64,

    /// Frames lost to buffer eviction or acquisition errors
    pub frames_dropped: u64,

    /// Failed delivery attempts (retried with backoff)
    pub send_failures: u64,

    /// Detection results processed by the results stage
    pub results_processed: u64,

    /// Results whose detections crossed the alert threshold
    pub alerts_fired: u64,

    /// Successful sink deliveries
    pub sink_deliveries: u64,

    /// Failed sink attempts
    pub sink_failures: u64,

    /// Audit entries appended
    pub audit_appends: u64,

    /// Results whose audit append failed
    pub audit_failures: u64,

    /// Events received by the demo dashboard subscriber
    pub events_received: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineStats {
    /// Results processed per second
    pub fn results_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.results_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");
        println!("Capture edge:");
        println!("  Frames captured: {}", self.frames_captured);
        println!("  Frames sent:     {}", self.frames_sent);
        println!("  Frames dropped:  {}", self.frames_dropped);
        println!("  Send failures:   {}", self.send_failures);
        println!("\nResults stage:");
        println!("  Results processed: {}", self.results_processed);
        println!("  Alerts fired:      {}", self.alerts_fired);
        println!("  Sink deliveries:   {}", self.sink_deliveries);
        println!("  Sink failures:     {}", self.sink_failures);
        println!("  Audit appends:     {}", self.audit_appends);
        println!("  Audit failures:    {}", self.audit_failures);
        println!("  Events broadcast:  {}", self.events_received);
        println!(
            "\nDuration: {:.2}s ({:.2} results/s)\n",
            self.duration.as_secs_f64(),
            self.results_per_sec()
        );
    }
}
