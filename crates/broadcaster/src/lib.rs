//! # Broadcaster
//!
//! Live event feed for dashboards: per-connection bounded queues, fan-out
//! on every processed result, heartbeats while idle, guaranteed
//! deregistration on disconnect.

mod hub;

pub use hub::{EventHub, StreamEvent, Subscription};
