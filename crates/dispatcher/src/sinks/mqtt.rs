//! MqttSink - one-shot message-bus publish
//!
//! Mirrors a fire-and-forget bus publish: a short-lived connection per
//! alert, QoS 1, success only when the broker acknowledges before the
//! per-call deadline.

use std::time::Duration;

use contracts::{AlertSink, DetectionResult, PipelineError};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tracing::{debug, instrument, warn};

/// Configuration for MqttSink
#[derive(Debug, Clone)]
pub struct MqttSinkConfig {
    pub enabled: bool,
    /// Broker host
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Per-publish deadline
    pub timeout: Duration,
    /// MQTT client identifier
    pub client_id: String,
}

impl Default for MqttSinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 1883,
            timeout: Duration::from_secs(3),
            client_id: "edgesight-results".to_string(),
        }
    }
}

/// Sink that publishes fired alerts to the plant message bus
pub struct MqttSink {
    name: String,
    config: MqttSinkConfig,
}

impl MqttSink {
    /// Create a new MqttSink
    pub fn new(name: impl Into<String>, config: MqttSinkConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Publish once and wait for the broker acknowledgment
    async fn publish_once(&self, topic: &str, payload: Vec<u8>) -> Result<(), PipelineError> {
        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.host.clone(),
            self.config.port,
        );
        options.set_keep_alive(Duration::from_secs(5));

        let (client, mut eventloop) = AsyncClient::new(options, 10);
        client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| PipelineError::SinkConnection {
                sink_name: self.name.clone(),
                message: e.to_string(),
            })?;

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::PubAck(_))) => {
                    let _ = client.disconnect().await;
                    return Ok(());
                }
                Ok(_) => continue,
                Err(e) => {
                    return Err(PipelineError::SinkConnection {
                        sink_name: self.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

impl AlertSink for MqttSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.config.enabled
    }

    #[instrument(
        name = "mqtt_sink_attempt",
        skip(self, result),
        fields(sink = %self.name, frame_id = result.frame_id)
    )]
    async fn attempt(&self, target: &str, result: &DetectionResult) -> bool {
        if !self.config.enabled {
            return false;
        }

        let payload = match serde_json::to_vec(result) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(sink = %self.name, error = %e, "alert payload encode failed");
                return false;
            }
        };

        match tokio::time::timeout(self.config.timeout, self.publish_once(target, payload)).await {
            Ok(Ok(())) => {
                debug!(sink = %self.name, topic = target, "alert published");
                true
            }
            Ok(Err(e)) => {
                debug!(sink = %self.name, error = %e, "publish failed");
                false
            }
            Err(_) => {
                debug!(sink = %self.name, "publish timed out");
                false
            }
        }
    }
}
