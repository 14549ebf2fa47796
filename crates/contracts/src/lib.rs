//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-stage data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - `Frame.captured_at_ns` is a monotonic nanosecond timestamp from the capture host
//! - `DetectionResult.produced_at` is a UTC ISO-8601 wall-clock string (audit identity)

mod config;
mod detection;
mod error;
mod frame;
mod governance;
mod sink;
mod source;

pub use config::*;
pub use detection::*;
pub use error::*;
pub use frame::*;
pub use governance::*;
pub use sink::*;
pub use source::FrameSource;
