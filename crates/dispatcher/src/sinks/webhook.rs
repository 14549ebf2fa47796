//! WebhookSink - HTTP POST of fired alerts

use std::time::Duration;

use contracts::{AlertSink, DetectionResult};
use tracing::{debug, instrument};

use crate::error::RouterError;

/// Configuration for WebhookSink
#[derive(Debug, Clone)]
pub struct WebhookSinkConfig {
    pub enabled: bool,
    /// POST deadline
    pub timeout: Duration,
}

impl Default for WebhookSinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout: Duration::from_secs(3),
        }
    }
}

/// Sink that POSTs the detection result as JSON to an operator webhook
pub struct WebhookSink {
    name: String,
    config: WebhookSinkConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Create a new WebhookSink
    pub fn new(name: impl Into<String>, config: WebhookSinkConfig) -> Result<Self, RouterError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RouterError::sink_creation(&name, e.to_string()))?;

        Ok(Self {
            name,
            config,
            client,
        })
    }
}

impl AlertSink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    #[instrument(
        name = "webhook_sink_attempt",
        skip(self, result),
        fields(sink = %self.name, frame_id = result.frame_id)
    )]
    async fn attempt(&self, target: &str, result: &DetectionResult) -> bool {
        if !self.config.enabled || target.is_empty() {
            return false;
        }

        match self.client.post(target).json(result).send().await {
            Ok(response) => {
                let delivered = response.status().as_u16() < 400;
                debug!(sink = %self.name, status = response.status().as_u16(), "webhook posted");
                delivered
            }
            Err(e) => {
                debug!(sink = %self.name, error = %e, "webhook post failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BBox, Detection};

    fn sample_result() -> DetectionResult {
        DetectionResult {
            frame_id: 9,
            detections: vec![Detection {
                bbox: BBox {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 1.0,
                    y2: 1.0,
                },
                score: 0.95,
                class_id: 1,
            }],
            produced_at: "2026-01-01T00:00:00Z".into(),
            model_hash: "m".into(),
            config_digest: "c".into(),
            latency_ms: Some(8.0),
        }
    }

    #[tokio::test]
    async fn test_empty_target_reports_false() {
        let sink = WebhookSink::new(
            "webhook",
            WebhookSinkConfig {
                enabled: true,
                timeout: Duration::from_millis(300),
            },
        )
        .unwrap();

        assert!(!sink.attempt("", &sample_result()).await);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_false() {
        let sink = WebhookSink::new(
            "webhook",
            WebhookSinkConfig {
                enabled: true,
                timeout: Duration::from_millis(300),
            },
        )
        .unwrap();

        assert!(
            !sink
                .attempt("http://127.0.0.1:59998/defect", &sample_result())
                .await
        );
    }
}
