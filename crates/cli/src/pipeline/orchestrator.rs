//! Pipeline orchestrator - coordinates all components.
//!
//! Two modes share the same results stage:
//! - demo: a synthetic source and stub detector drive the full path
//!   in-process, with one subscriber standing in for a dashboard
//! - edge: the capture session delivers frames to the configured external
//!   transform endpoint; results are processed by whatever host embeds the
//!   results stage

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use broadcaster::{EventHub, StreamEvent};
use capture::{
    CaptureSession, HttpTransformClient, HttpTransformConfig, SyntheticSource,
    SyntheticSourceConfig, TransformClient,
};
use chrono::{SecondsFormat, Utc};
use contracts::{
    BBox, CaptureConfig, Detection, DetectionResult, Frame, FrameSource, PipelineError, RunConfig,
};
use dispatcher::{
    MqttSink, MqttSinkConfig, RouteTargets, Router, TagSink, TagSinkConfig, WebhookSink,
    WebhookSinkConfig,
};
use governance::GovernanceLog;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::processor::ResultsProcessor;
use super::PipelineStats;

/// Production router over the three concrete sinks
pub type ProdRouter = Router<MqttSink, TagSink, WebhookSink>;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The validated run configuration
    pub run: RunConfig,

    /// Run the full results path in-process
    pub demo: bool,

    /// Maximum results to process in demo mode (None = unlimited)
    pub max_results: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let run = &self.config.run;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Governance log handle, built once and shared by reference
        let governance = Arc::new(
            GovernanceLog::open(&run.governance.base_dir).with_context(|| {
                format!(
                    "Failed to open governance log at {}",
                    run.governance.base_dir.display()
                )
            })?,
        );

        // Startup retention sweep
        let removed = governance.enforce_retention(run.governance.retention_days);
        if removed > 0 {
            info!(removed, "retention sweep removed expired partitions");
        }

        let router = Arc::new(build_router(run).context("Failed to create sinks")?);
        let hub = Arc::new(EventHub::new(
            run.broadcast.queue_capacity,
            Duration::from_secs(run.broadcast.heartbeat_secs),
        ));
        let processor = ResultsProcessor::new(
            governance,
            Arc::clone(&router),
            Arc::clone(&hub),
            run.results.conf_threshold,
        );

        if self.config.demo {
            info!("Running in DEMO mode (no external services required)");
            self.run_demo(processor, hub, start_time).await
        } else {
            info!(
                transform_url = %run.capture.transform_url,
                "Running in EDGE mode (delivering to external transform stage)"
            );
            self.run_edge(start_time).await
        }
    }

    /// Full in-process loop: synthetic frames → stub detector → results stage
    async fn run_demo(
        &self,
        processor: ResultsProcessor<MqttSink, TagSink, WebhookSink>,
        hub: Arc<EventHub>,
        start_time: Instant,
    ) -> Result<PipelineStats> {
        let run = &self.config.run;

        // Capture session delivering into an in-process channel
        let (tx, mut rx) = mpsc::channel::<Frame>(run.capture.buffer_capacity.max(1));
        let session = CaptureSession::new(run.capture.clone());
        session.start(make_source(&run.capture)?, Arc::new(ChannelTransform { tx }));

        // One live subscriber standing in for a dashboard
        let mut subscription = hub.subscribe();
        let drain = tokio::spawn(async move {
            let mut received = 0u64;
            loop {
                match subscription.next_event().await {
                    StreamEvent::Data(_) => received += 1,
                    StreamEvent::Heartbeat => {}
                    StreamEvent::Closed => break,
                }
            }
            received
        });

        let max_results = self.config.max_results;
        let mut stats = PipelineStats::default();

        let results_loop = async {
            while let Some(frame) = rx.recv().await {
                let result = stub_detect(&frame);
                match processor.process(&result).await {
                    Ok(processed) => {
                        debug!(
                            frame_id = processed.entry.record.frame_id,
                            fired = processed.outcome.fired,
                            fanout = processed.fanout,
                            "result processed"
                        );
                        stats.results_processed += 1;
                        stats.audit_appends += 1;
                        if processed.outcome.fired {
                            stats.alerts_fired += 1;
                        }
                        stats.sink_deliveries += processed
                            .outcome
                            .attempts
                            .iter()
                            .filter(|a| a.delivered)
                            .count() as u64;
                        stats.sink_failures += processed
                            .outcome
                            .attempts
                            .iter()
                            .filter(|a| !a.delivered)
                            .count() as u64;
                    }
                    Err(e) => {
                        warn!(frame_id = result.frame_id, error = %e, "result processing failed");
                        stats.audit_failures += 1;
                    }
                }

                if let Some(max) = max_results {
                    if stats.results_processed >= max {
                        info!(results = stats.results_processed, "Reached max results limit");
                        break;
                    }
                }
            }
        };

        // Run with optional timeout
        if let Some(timeout) = self.config.timeout {
            if tokio::time::timeout(timeout, results_loop).await.is_err() {
                warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
            }
        } else {
            results_loop.await;
        }

        // Shutdown. Dropping the receiver unblocks a worker mid-send so the
        // cancel token is observed at its next checkpoint.
        info!("Shutting down pipeline...");
        session.stop();
        drop(rx);
        session.join();
        hub.shutdown();
        stats.events_received = drain.await.unwrap_or(0);

        let snapshot = session.metrics().snapshot();
        stats.frames_captured = snapshot.frames_captured;
        stats.frames_sent = snapshot.frames_sent;
        stats.frames_dropped = snapshot.frames_dropped;
        stats.send_failures = snapshot.send_failures;
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            results = stats.results_processed,
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    /// Capture edge only: deliver frames to the external transform stage
    async fn run_edge(&self, start_time: Instant) -> Result<PipelineStats> {
        let run = &self.config.run;

        let client = HttpTransformClient::new(HttpTransformConfig {
            transform_url: run.capture.transform_url.clone(),
            preview_url: run.capture.preview_url.clone(),
            request_timeout: Duration::from_millis(run.capture.request_timeout_ms),
            preview_timeout: Duration::from_millis(run.capture.preview_timeout_ms),
        })
        .context("Failed to create transform client")?;

        let session = CaptureSession::new(run.capture.clone());
        session.start(make_source(&run.capture)?, Arc::new(client));

        // Run until the timeout elapses, or forever until shutdown
        if let Some(timeout) = self.config.timeout {
            tokio::time::sleep(timeout).await;
        } else {
            std::future::pending::<()>().await;
        }

        info!("Shutting down capture session...");
        session.stop();
        session.join();

        let snapshot = session.metrics().snapshot();
        let stats = PipelineStats {
            frames_captured: snapshot.frames_captured,
            frames_sent: snapshot.frames_sent,
            frames_dropped: snapshot.frames_dropped,
            send_failures: snapshot.send_failures,
            duration: start_time.elapsed(),
            ..Default::default()
        };

        Ok(stats)
    }
}

/// Build the production router from configuration
pub fn build_router(run: &RunConfig) -> Result<ProdRouter, dispatcher::RouterError> {
    let sinks = &run.sinks;

    let message_bus = MqttSink::new(
        "message_bus",
        MqttSinkConfig {
            enabled: sinks.message_bus.enabled,
            host: sinks.message_bus.host.clone(),
            port: sinks.message_bus.port,
            timeout: Duration::from_millis(sinks.message_bus.timeout_ms),
            client_id: format!("edgesight-{}", run.line_id),
        },
    );

    let tag_write = TagSink::with_logging_writer(
        "tag_write",
        TagSinkConfig {
            enabled: sinks.tag_write.enabled,
            endpoint: sinks.tag_write.endpoint.clone(),
        },
    );

    let webhook = WebhookSink::new(
        "webhook",
        WebhookSinkConfig {
            enabled: sinks.webhook.enabled,
            timeout: Duration::from_millis(sinks.webhook.timeout_ms),
        },
    )?;

    let targets = RouteTargets::for_line(&run.line_id, sinks.webhook.url.as_deref());
    Ok(Router::new(targets, message_bus, tag_write, webhook))
}

/// Build the frame source for a capture session
///
/// The shipped binary generates synthetic frames; camera backends implement
/// `FrameSource` and plug in at the library level.
fn make_source(capture: &CaptureConfig) -> Result<Box<dyn FrameSource>> {
    if capture.source.starts_with("synthetic:") {
        Ok(Box::new(SyntheticSource::new(SyntheticSourceConfig {
            fps: capture.fps_cap,
            payload_size: 4096,
        })))
    } else {
        anyhow::bail!(
            "unsupported frame source '{}' (this binary ships the synthetic source only)",
            capture.source
        )
    }
}

/// Transform client that hands frames straight to the in-process results
/// loop (demo mode)
struct ChannelTransform {
    tx: mpsc::Sender<Frame>,
}

impl TransformClient for ChannelTransform {
    fn deliver(&self, frame: &Frame) -> Result<(), PipelineError> {
        self.tx
            .blocking_send(frame.clone())
            .map_err(|_| PipelineError::delivery("results channel closed"))
    }

    fn push_preview(&self, _payload: &bytes::Bytes) -> bool {
        true
    }
}

/// Deterministic stand-in for the external transform + detector pair
///
/// Cycles through a high-confidence defect, a low-confidence detection and
/// a clean frame so routing, audit and broadcast all see both outcomes.
fn stub_detect(frame: &Frame) -> DetectionResult {
    let detections = match frame.id % 3 {
        0 => vec![Detection {
            bbox: BBox {
                x1: 48.0,
                y1: 32.0,
                x2: 112.0,
                y2: 96.0,
            },
            score: 0.9,
            class_id: 0,
        }],
        1 => vec![Detection {
            bbox: BBox {
                x1: 10.0,
                y1: 10.0,
                x2: 20.0,
                y2: 20.0,
            },
            score: 0.2,
            class_id: 1,
        }],
        _ => Vec::new(),
    };

    DetectionResult {
        frame_id: frame.id,
        detections,
        produced_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        model_hash: "demo".to_string(),
        config_digest: "demo".to_string(),
        latency_ms: Some(2.0 + (frame.id % 5) as f64),
    }
}
