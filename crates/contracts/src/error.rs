//! Layered error definitions
//!
//! Categorized by source: config / capture / delivery / audit / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum PipelineError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Capture Errors =====
    /// Frame source could not be opened
    #[error("frame source open error for '{source_uri}': {message}")]
    SourceOpen { source_uri: String, message: String },

    /// Frame acquisition error
    #[error("frame read error: {message}")]
    FrameRead { message: String },

    /// Image encode error
    #[error("image encode error for frame {frame_id}: {message}")]
    ImageEncode { frame_id: u64, message: String },

    // ===== Delivery Errors =====
    /// Transform-stage handoff failed (timeout, transport error)
    #[error("frame delivery error: {message}")]
    Delivery { message: String },

    /// Transform-stage handoff rejected with an error-class status
    #[error("frame delivery rejected with status {status}")]
    DeliveryStatus { status: u16 },

    // ===== Audit Errors =====
    /// Signing key load/persist error
    #[error("key store error: {message}")]
    KeyStore { message: String },

    /// Record could not be canonically encoded for signing
    #[error("audit encoding error: {message}")]
    AuditEncode { message: String },

    /// Audit log append failed
    #[error("audit write error for partition '{partition}': {message}")]
    AuditWrite { partition: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create frame source open error
    pub fn source_open(source_uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceOpen {
            source_uri: source_uri.into(),
            message: message.into(),
        }
    }

    /// Create frame read error
    pub fn frame_read(message: impl Into<String>) -> Self {
        Self::FrameRead {
            message: message.into(),
        }
    }

    /// Create delivery error
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Create audit write error
    pub fn audit_write(partition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AuditWrite {
            partition: partition.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
