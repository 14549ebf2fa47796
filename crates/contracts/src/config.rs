//! RunConfig - Config Loader output
//!
//! Describes the complete pipeline configuration: capture edge, alerting,
//! governance, per-sink routing, live broadcast. The core consumes these
//! values; parsing and validation belong to `config_loader`.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Complete pipeline run configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunConfig {
    /// Inspection line identifier, used in topics and tag addresses
    #[serde(default = "default_line_id")]
    #[validate(length(min = 1))]
    pub line_id: String,

    /// Capture edge settings
    #[validate(nested)]
    pub capture: CaptureConfig,

    /// Alerting settings
    #[serde(default)]
    #[validate(nested)]
    pub results: ResultsConfig,

    /// Audit log settings
    #[serde(default)]
    #[validate(nested)]
    pub governance: GovernanceConfig,

    /// Downstream sink routing
    #[serde(default)]
    pub sinks: SinksConfig,

    /// Live event broadcast settings
    #[serde(default)]
    #[validate(nested)]
    pub broadcast: BroadcastConfig,
}

fn default_line_id() -> String {
    "line-1".to_string()
}

/// Capture edge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CaptureConfig {
    /// Frame source URI (`synthetic:` for the built-in generator)
    #[serde(default = "default_source")]
    pub source: String,

    /// Frame rate ceiling (Hz)
    #[serde(default = "default_fps_cap")]
    #[validate(range(min = 0.1, max = 120.0))]
    pub fps_cap: f64,

    /// Frame width after capture-side resize
    #[serde(default = "default_width")]
    pub width: u32,

    /// Frame height after capture-side resize
    #[serde(default = "default_height")]
    pub height: u32,

    /// Reliability buffer capacity (frames)
    #[serde(default = "default_buffer_capacity")]
    #[validate(range(min = 1))]
    pub buffer_capacity: usize,

    /// Retry backoff floor (ms)
    #[serde(default = "default_backoff_floor_ms")]
    #[validate(range(min = 1))]
    pub backoff_floor_ms: u64,

    /// Retry backoff ceiling (ms)
    #[serde(default = "default_backoff_ceiling_ms")]
    #[validate(range(min = 1))]
    pub backoff_ceiling_ms: u64,

    /// Transform-stage request timeout (ms)
    #[serde(default = "default_request_timeout_ms")]
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,

    /// Preview push timeout (ms)
    #[serde(default = "default_preview_timeout_ms")]
    pub preview_timeout_ms: u64,

    /// Transform stage endpoint receiving frames
    #[serde(default = "default_transform_url")]
    pub transform_url: String,

    /// Optional best-effort preview endpoint
    #[serde(default)]
    pub preview_url: Option<String>,
}

fn default_source() -> String {
    "synthetic:".to_string()
}

fn default_fps_cap() -> f64 {
    10.0
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    360
}

fn default_buffer_capacity() -> usize {
    50
}

fn default_backoff_floor_ms() -> u64 {
    200
}

fn default_backoff_ceiling_ms() -> u64 {
    2000
}

fn default_request_timeout_ms() -> u64 {
    1500
}

fn default_preview_timeout_ms() -> u64 {
    200
}

fn default_transform_url() -> String {
    "http://preprocess:9002/frame".to_string()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            fps_cap: default_fps_cap(),
            width: default_width(),
            height: default_height(),
            buffer_capacity: default_buffer_capacity(),
            backoff_floor_ms: default_backoff_floor_ms(),
            backoff_ceiling_ms: default_backoff_ceiling_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            preview_timeout_ms: default_preview_timeout_ms(),
            transform_url: default_transform_url(),
            preview_url: None,
        }
    }
}

/// Alerting configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResultsConfig {
    /// Minimum detection score that fires downstream alerts
    #[serde(default = "default_conf_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub conf_threshold: f32,
}

fn default_conf_threshold() -> f32 {
    0.5
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            conf_threshold: default_conf_threshold(),
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GovernanceConfig {
    /// Base directory for day partitions and the key store
    #[serde(default = "default_governance_dir")]
    pub base_dir: std::path::PathBuf,

    /// Retention horizon in days
    #[serde(default = "default_retention_days")]
    #[validate(range(min = 1))]
    pub retention_days: u32,
}

fn default_governance_dir() -> std::path::PathBuf {
    std::path::PathBuf::from("./data/governance")
}

fn default_retention_days() -> u32 {
    30
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            base_dir: default_governance_dir(),
            retention_days: default_retention_days(),
        }
    }
}

/// Per-sink routing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinksConfig {
    #[serde(default)]
    pub message_bus: MessageBusConfig,

    #[serde(default)]
    pub tag_write: TagWriteConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Message bus (MQTT) sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBusConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_broker_host")]
    pub host: String,

    #[serde(default = "default_broker_port")]
    pub port: u16,

    /// Per-publish deadline (ms)
    #[serde(default = "default_sink_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_broker_host() -> String {
    "localhost".to_string()
}

fn default_broker_port() -> u16 {
    1883
}

fn default_sink_timeout_ms() -> u64 {
    3000
}

impl Default for MessageBusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_broker_host(),
            port: default_broker_port(),
            timeout_ms: default_sink_timeout_ms(),
        }
    }
}

/// Industrial tag write sink configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagWriteConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Tag server endpoint, connector specific
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Webhook sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub url: Option<String>,

    /// POST deadline (ms)
    #[serde(default = "default_sink_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            timeout_ms: default_sink_timeout_ms(),
        }
    }
}

/// Live broadcast configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BroadcastConfig {
    /// Idle interval before a heartbeat is emitted (seconds)
    #[serde(default = "default_heartbeat_secs")]
    #[validate(range(min = 1))]
    pub heartbeat_secs: u64,

    /// Per-subscriber queue bound (drop-oldest beyond this)
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,
}

fn default_heartbeat_secs() -> u64 {
    10
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            heartbeat_secs: default_heartbeat_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}
