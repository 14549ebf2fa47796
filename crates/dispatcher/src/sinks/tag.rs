//! TagSink - industrial tag write
//!
//! Routes fired alerts to the plant tag server. The transport is the
//! pluggable `TagWriter` trait so site-specific connectors (OPC UA, Modbus)
//! can be dropped in without touching routing; the shipped connector records
//! the write through structured logging.

use contracts::{AlertSink, DetectionResult};
use tracing::{debug, info, instrument};

/// Tag server connector
///
/// A connector owns its transport, bounds its own wait time and reports the
/// write outcome as a boolean.
pub trait TagWriter: Send + Sync {
    /// Write the defect flag for `target`, carrying the triggering result
    fn write_defect_tag(&self, target: &str, result: &DetectionResult) -> bool;
}

/// Connector that records tag writes in the process log
///
/// Stands in where no plant connector is configured, keeping the routing
/// path exercised end to end.
#[derive(Debug, Default)]
pub struct LoggingTagWriter;

impl TagWriter for LoggingTagWriter {
    fn write_defect_tag(&self, target: &str, result: &DetectionResult) -> bool {
        info!(
            target = %target,
            frame_id = result.frame_id,
            detections = result.detections.len(),
            "defect tag written"
        );
        true
    }
}

/// Configuration for TagSink
#[derive(Debug, Clone, Default)]
pub struct TagSinkConfig {
    pub enabled: bool,
    /// Connector-specific endpoint, recorded for diagnostics
    pub endpoint: Option<String>,
}

/// Sink that writes a defect tag on the tag server
pub struct TagSink {
    name: String,
    config: TagSinkConfig,
    writer: Box<dyn TagWriter>,
}

impl TagSink {
    /// Create a TagSink with the given connector
    pub fn new(name: impl Into<String>, config: TagSinkConfig, writer: Box<dyn TagWriter>) -> Self {
        Self {
            name: name.into(),
            config,
            writer,
        }
    }

    /// Create a TagSink with the logging connector
    pub fn with_logging_writer(name: impl Into<String>, config: TagSinkConfig) -> Self {
        Self::new(name, config, Box::new(LoggingTagWriter))
    }
}

impl AlertSink for TagSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    #[instrument(
        name = "tag_sink_attempt",
        skip(self, result),
        fields(sink = %self.name, frame_id = result.frame_id)
    )]
    async fn attempt(&self, target: &str, result: &DetectionResult) -> bool {
        if !self.config.enabled {
            return false;
        }

        let written = self.writer.write_defect_tag(target, result);
        debug!(sink = %self.name, target = %target, written, "tag write attempted");
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BBox, Detection};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct CountingWriter {
        writes: Arc<AtomicU64>,
        outcome: bool,
    }

    impl TagWriter for CountingWriter {
        fn write_defect_tag(&self, _target: &str, _result: &DetectionResult) -> bool {
            self.writes.fetch_add(1, Ordering::Relaxed);
            self.outcome
        }
    }

    fn sample_result() -> DetectionResult {
        DetectionResult {
            frame_id: 5,
            detections: vec![Detection {
                bbox: BBox {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 1.0,
                    y2: 1.0,
                },
                score: 0.8,
                class_id: 2,
            }],
            produced_at: "2026-01-01T00:00:00Z".into(),
            model_hash: "m".into(),
            config_digest: "c".into(),
            latency_ms: None,
        }
    }

    #[tokio::test]
    async fn test_attempt_uses_connector() {
        let writes = Arc::new(AtomicU64::new(0));
        let sink = TagSink::new(
            "tag",
            TagSinkConfig {
                enabled: true,
                endpoint: None,
            },
            Box::new(CountingWriter {
                writes: Arc::clone(&writes),
                outcome: true,
            }),
        );

        assert!(sink.attempt("line-1", &sample_result()).await);
        assert_eq!(writes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_connector_failure_reports_false() {
        let writes = Arc::new(AtomicU64::new(0));
        let sink = TagSink::new(
            "tag",
            TagSinkConfig {
                enabled: true,
                endpoint: None,
            },
            Box::new(CountingWriter {
                writes,
                outcome: false,
            }),
        );

        assert!(!sink.attempt("line-1", &sample_result()).await);
    }

    #[tokio::test]
    async fn test_disabled_sink_skips_connector() {
        let writes = Arc::new(AtomicU64::new(0));
        let sink = TagSink::new(
            "tag",
            TagSinkConfig::default(),
            Box::new(CountingWriter {
                writes: Arc::clone(&writes),
                outcome: true,
            }),
        );

        assert!(!sink.attempt("line-1", &sample_result()).await);
        assert_eq!(writes.load(Ordering::Relaxed), 0);
    }
}
