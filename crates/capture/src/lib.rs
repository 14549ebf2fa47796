//! # Capture
//!
//! Capture edge of the inspection line: frame acquisition, the bounded
//! reliability buffer, and the blocking delivery worker that hands frames to
//! the preprocessing transform.
//!
//! Responsibilities:
//! - Decouple frame production rate from transform-stage availability
//! - Retry failed deliveries in order, with bounded exponential backoff
//! - Evict oldest frames (counted, silent) under capacity pressure
//! - Push best-effort previews without touching delivery state

mod backoff;
mod buffer;
mod metrics;
mod synthetic;
mod transport;
mod worker;

pub use backoff::Backoff;
pub use buffer::FrameBuffer;
pub use metrics::{CaptureMetrics, CaptureMetricsSnapshot};
pub use synthetic::{SyntheticSource, SyntheticSourceConfig};
pub use transport::{HttpTransformClient, HttpTransformConfig, TransformClient};
pub use worker::{CancelToken, CaptureSession, StartStatus};
