//! Transform-stage delivery client
//!
//! The capture worker hands frames to the preprocessing transform over HTTP.
//! Delivery is a blocking call with a hard request timeout; the preview push
//! is best-effort and reports a success flag the caller may ignore.

use std::time::Duration;

use bytes::Bytes;
use contracts::{Frame, PipelineError};
use tracing::{debug, instrument, trace};

/// Frame handoff to the transform stage
///
/// Implementations own their transport and must bound every call: `deliver`
/// by the configured request timeout, `push_preview` by the (much shorter)
/// preview timeout.
pub trait TransformClient: Send + Sync {
    /// Hand one frame to the transform stage
    ///
    /// # Errors
    /// Timeout, transport error and error-class responses are all delivery
    /// failures; the worker retries the same frame with backoff.
    fn deliver(&self, frame: &Frame) -> Result<(), PipelineError>;

    /// Best-effort push of the most recent frame to the preview endpoint
    ///
    /// Never touches buffer or backoff state; failure is reported as `false`
    /// and otherwise fully swallowed.
    fn push_preview(&self, payload: &Bytes) -> bool;
}

/// HTTP transform client configuration
#[derive(Debug, Clone)]
pub struct HttpTransformConfig {
    /// Transform stage endpoint receiving frames
    pub transform_url: String,
    /// Optional preview endpoint
    pub preview_url: Option<String>,
    /// Delivery request timeout
    pub request_timeout: Duration,
    /// Preview push timeout
    pub preview_timeout: Duration,
}

/// Blocking HTTP client for the capture→transform handoff
///
/// Frames travel as a multipart form: `frame_id` and `ts_monotonic_ns` as
/// text fields, the encoded image as a file part.
pub struct HttpTransformClient {
    config: HttpTransformConfig,
    client: reqwest::blocking::Client,
}

impl HttpTransformClient {
    /// Create a new client
    ///
    /// # Errors
    /// Returns `PipelineError::Delivery` if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: HttpTransformConfig) -> Result<Self, PipelineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PipelineError::delivery(format!("http client build: {e}")))?;

        Ok(Self { config, client })
    }

    fn build_form(frame: &Frame) -> reqwest::blocking::multipart::Form {
        let part = reqwest::blocking::multipart::Part::bytes(frame.payload.to_vec())
            .file_name(format!("{}.jpg", frame.id))
            .mime_str("image/jpeg")
            .unwrap_or_else(|_| {
                reqwest::blocking::multipart::Part::bytes(frame.payload.to_vec())
            });

        reqwest::blocking::multipart::Form::new()
            .text("frame_id", frame.id.to_string())
            .text("ts_monotonic_ns", frame.captured_at_ns.to_string())
            .part("image", part)
    }
}

impl TransformClient for HttpTransformClient {
    #[instrument(
        name = "transform_deliver",
        skip(self, frame),
        fields(frame_id = frame.id, bytes = frame.payload.len())
    )]
    fn deliver(&self, frame: &Frame) -> Result<(), PipelineError> {
        let response = self
            .client
            .post(&self.config.transform_url)
            .multipart(Self::build_form(frame))
            .timeout(self.config.request_timeout)
            .send()
            .map_err(|e| PipelineError::delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::DeliveryStatus {
                status: status.as_u16(),
            });
        }

        debug!(frame_id = frame.id, "frame delivered");
        Ok(())
    }

    fn push_preview(&self, payload: &Bytes) -> bool {
        let Some(preview_url) = self.config.preview_url.as_deref() else {
            return false;
        };

        let sent = self
            .client
            .post(preview_url)
            .body(payload.to_vec())
            .timeout(self.config.preview_timeout)
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false);

        trace!(sent, bytes = payload.len(), "preview push");
        sent
    }
}
