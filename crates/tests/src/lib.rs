//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - contract snapshot checks
//! - the full results path (route + audit + broadcast) without external services
//! - capture-to-results flow over an in-process channel

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{BBox, Detection, DetectionResult};

    #[test]
    fn test_minimal_config_loads_with_defaults() {
        let config = ConfigLoader::load_from_str(
            "[capture]\ntransform_url = \"http://localhost:9002/frame\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(config.line_id, "line-1");
        assert_eq!(config.capture.backoff_floor_ms, 200);
        assert_eq!(config.capture.backoff_ceiling_ms, 2000);
        assert_eq!(config.broadcast.heartbeat_secs, 10);
    }

    #[test]
    fn test_result_wire_format_is_stable() {
        let result = DetectionResult {
            frame_id: 3,
            detections: vec![Detection {
                bbox: BBox {
                    x1: 1.0,
                    y1: 2.0,
                    x2: 3.0,
                    y2: 4.0,
                },
                score: 0.7,
                class_id: 5,
            }],
            produced_at: "2026-01-01T00:00:00Z".into(),
            model_hash: "m".into(),
            config_digest: "c".into(),
            latency_ms: Some(4.5),
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: DetectionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.frame_id, 3);
        assert_eq!(parsed.detections.len(), 1);
        assert_eq!(parsed.detections[0].class_id, 5);

        // latency_ms is optional on the wire
        let without_latency = r#"{
            "frame_id": 4,
            "detections": [],
            "produced_at": "2026-01-01T00:00:00Z",
            "model_hash": "m",
            "config_digest": "c"
        }"#;
        let parsed: DetectionResult = serde_json::from_str(without_latency).unwrap();
        assert_eq!(parsed.latency_ms, None);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use broadcaster::{EventHub, StreamEvent};
    use chrono::Utc;
    use contracts::{
        AlertSink, BBox, Detection, DetectionResult, GovernanceRecord, ResultEvent,
    };
    use dispatcher::{RouteOutcome, RouteTargets, Router};
    use governance::GovernanceLog;
    use tempfile::tempdir;

    /// Mock sink with controllable outcome and a shared call counter
    struct MockSink {
        name: String,
        enabled: bool,
        outcome: bool,
        calls: Arc<AtomicU64>,
    }

    impl MockSink {
        fn new(name: &str, enabled: bool, outcome: bool) -> (Self, Arc<AtomicU64>) {
            let calls = Arc::new(AtomicU64::new(0));
            let sink = Self {
                name: name.to_string(),
                enabled,
                outcome,
                calls: Arc::clone(&calls),
            };
            (sink, calls)
        }
    }

    impl AlertSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn attempt(&self, _target: &str, _result: &DetectionResult) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }
    }

    fn result_with_score(frame_id: u64, score: f32) -> DetectionResult {
        let detections = if score > 0.0 {
            vec![Detection {
                bbox: BBox {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 10.0,
                    y2: 10.0,
                },
                score,
                class_id: 0,
            }]
        } else {
            Vec::new()
        };
        DetectionResult {
            frame_id,
            detections,
            produced_at: "2026-01-01T00:00:00Z".into(),
            model_hash: "m".into(),
            config_digest: "c".into(),
            latency_ms: Some(5.0),
        }
    }

    /// The results stage for one result: route, audit and broadcast run as
    /// independent concurrent branches, none gating another.
    async fn process_result(
        log: &Arc<GovernanceLog>,
        router: &Router<MockSink, MockSink, MockSink>,
        hub: &EventHub,
        result: &DetectionResult,
        threshold: f32,
    ) -> RouteOutcome {
        let record = GovernanceRecord::from_result(result, threshold);
        let event = ResultEvent::from_result(result);
        let log = Arc::clone(log);

        let (outcome, _fanout, audit) = tokio::join!(
            router.route(result, threshold),
            async { hub.publish(&event) },
            tokio::task::spawn_blocking(move || log.append(&record)),
        );
        audit.unwrap().unwrap();
        outcome
    }

    fn make_router(
        bus: MockSink,
        tag: MockSink,
        webhook: MockSink,
    ) -> Router<MockSink, MockSink, MockSink> {
        Router::new(
            RouteTargets::for_line("line-1", Some("http://hooks/defect")),
            bus,
            tag,
            webhook,
        )
    }

    /// End-to-end scenario: a firing result produces one audit entry, one
    /// attempt per enabled sink and one broadcast event per subscriber; a
    /// non-firing result produces one audit entry and nothing else.
    #[tokio::test]
    async fn test_e2e_fire_and_no_fire() {
        let dir = tempdir().unwrap();
        let log = Arc::new(GovernanceLog::open(dir.path()).unwrap());
        let hub = EventHub::new(16, Duration::from_secs(10));

        let (bus, bus_calls) = MockSink::new("message_bus", true, true);
        let (tag, tag_calls) = MockSink::new("tag_write", true, true);
        let (webhook, webhook_calls) = MockSink::new("webhook", true, true);
        let router = make_router(bus, tag, webhook);

        let mut sub_a = hub.subscribe();
        let mut sub_b = hub.subscribe();

        // Fires at threshold 0.5
        let outcome = process_result(&log, &router, &hub, &result_with_score(1, 0.9), 0.5).await;
        assert!(outcome.fired);
        assert_eq!(outcome.attempts.len(), 3);
        assert_eq!(bus_calls.load(Ordering::SeqCst), 1);
        assert_eq!(tag_calls.load(Ordering::SeqCst), 1);
        assert_eq!(webhook_calls.load(Ordering::SeqCst), 1);

        // Does not fire, sinks untouched, audit and broadcast still happen
        let outcome = process_result(&log, &router, &hub, &result_with_score(2, 0.1), 0.5).await;
        assert!(!outcome.fired);
        assert!(outcome.attempts.is_empty());
        assert_eq!(bus_calls.load(Ordering::SeqCst), 1);

        let today = Utc::now().date_naive();
        let summary = log.summarize(today, today).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.invalid_signature_count, 0);

        // Both subscribers saw both events
        for sub in [&mut sub_a, &mut sub_b] {
            let StreamEvent::Data(first) = sub.next_event().await else {
                panic!("expected data");
            };
            let StreamEvent::Data(second) = sub.next_event().await else {
                panic!("expected data");
            };
            assert!(first.contains("\"frame_id\":1"));
            assert!(second.contains("\"frame_id\":2"));
        }
    }

    /// A failing message-bus sink must not suppress the other sinks or the
    /// audit append.
    #[tokio::test]
    async fn test_sink_isolation_preserves_audit() {
        let dir = tempdir().unwrap();
        let log = Arc::new(GovernanceLog::open(dir.path()).unwrap());
        let hub = EventHub::new(16, Duration::from_secs(10));

        let (bus, _bus_calls) = MockSink::new("message_bus", true, false);
        let (tag, tag_calls) = MockSink::new("tag_write", true, true);
        let (webhook, webhook_calls) = MockSink::new("webhook", true, true);
        let router = make_router(bus, tag, webhook);

        let outcome = process_result(&log, &router, &hub, &result_with_score(1, 0.9), 0.5).await;

        assert_eq!(tag_calls.load(Ordering::SeqCst), 1);
        assert_eq!(webhook_calls.load(Ordering::SeqCst), 1);
        assert!(!outcome.attempts[0].delivered);
        assert!(outcome.attempts[1].delivered);

        let today = Utc::now().date_naive();
        let summary = log.summarize(today, today).unwrap();
        assert_eq!(summary.total, 1);
    }

    /// Every appended entry verifies under a fresh handle on the same key
    /// material, and a tampered copy does not.
    #[tokio::test]
    async fn test_audit_trail_survives_restart() {
        let dir = tempdir().unwrap();

        let entry = {
            let log = GovernanceLog::open(dir.path()).unwrap();
            log.append(&GovernanceRecord::from_result(
                &result_with_score(11, 0.8),
                0.5,
            ))
            .unwrap()
        };

        let reopened = GovernanceLog::open(dir.path()).unwrap();
        assert!(reopened.verify(&entry));

        let mut tampered = entry;
        tampered.record.detections[0].score = 0.05;
        assert!(!reopened.verify(&tampered));
    }
}

#[cfg(test)]
mod capture_flow_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use capture::{CaptureSession, SyntheticSource, SyntheticSourceConfig, TransformClient};
    use contracts::{CaptureConfig, Frame, PipelineError};
    use tokio::sync::mpsc;

    /// Transform client bridging the blocking capture worker into an async
    /// results loop
    struct ChannelTransform {
        tx: mpsc::Sender<Frame>,
    }

    impl TransformClient for ChannelTransform {
        fn deliver(&self, frame: &Frame) -> Result<(), PipelineError> {
            self.tx
                .blocking_send(frame.clone())
                .map_err(|_| PipelineError::delivery("results channel closed"))
        }

        fn push_preview(&self, _payload: &Bytes) -> bool {
            true
        }
    }

    /// Frames flow from the synthetic source through the reliability buffer
    /// into the results loop, in order and without gaps.
    #[tokio::test]
    async fn test_capture_to_results_channel_flow() {
        let (tx, mut rx) = mpsc::channel::<Frame>(32);

        let session = CaptureSession::new(CaptureConfig {
            buffer_capacity: 32,
            backoff_floor_ms: 1,
            backoff_ceiling_ms: 4,
            ..Default::default()
        });
        let source = SyntheticSource::new(SyntheticSourceConfig {
            fps: 200.0,
            payload_size: 256,
        });
        session.start(Box::new(source), Arc::new(ChannelTransform { tx }));

        let mut received = Vec::new();
        while received.len() < 5 {
            match tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
                Ok(Some(frame)) => received.push(frame.id),
                _ => break,
            }
        }

        session.stop();
        // Unblock a worker mid-send so it can observe the cancel token
        drop(rx);
        session.join();

        assert!(received.len() >= 5, "got {} frames", received.len());
        for (i, id) in received.iter().enumerate() {
            assert_eq!(*id, i as u64);
        }
        assert!(!session.metrics().is_running());
    }
}
