//! FrameSource trait - frame acquisition abstraction
//!
//! Decouples the capture worker from concrete camera backends. Implementations
//! pace themselves to their configured frame rate; `next_frame` blocks until
//! the next frame is due.

use crate::{Frame, PipelineError};

/// Blocking frame producer
///
/// The capture worker owns exactly one source and drives it from a dedicated
/// thread, so implementations may keep internal mutable decode state without
/// synchronization.
pub trait FrameSource: Send {
    /// Identifier of the underlying source (URI or synthetic label)
    fn source_id(&self) -> &str;

    /// Acquire the next frame, blocking until one is available
    ///
    /// # Errors
    /// Returns `PipelineError::FrameRead` when the backend fails to produce a
    /// decodable frame. A failed read does not invalidate the source; the
    /// worker decides whether to continue.
    fn next_frame(&mut self) -> Result<Frame, PipelineError>;
}
