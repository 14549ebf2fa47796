//! # Dispatcher
//!
//! The dispatch router of the results stage: decides per detection result
//! whether to alert downstream operational systems and delivers the alert to
//! each independently configured sink, isolating every sink failure from the
//! others and from audit logging.

mod error;
mod metrics;
mod router;
mod sinks;

pub use error::RouterError;
pub use metrics::{RouterMetrics, RouterMetricsSnapshot, SinkStats};
pub use router::{RouteOutcome, RouteTargets, Router, SinkAttempt};
pub use sinks::{
    LoggingTagWriter, MqttSink, MqttSinkConfig, TagSink, TagSinkConfig, TagWriter, WebhookSink,
    WebhookSinkConfig,
};
