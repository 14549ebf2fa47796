//! Router error types

use thiserror::Error;

/// Router-specific errors
#[derive(Debug, Error)]
pub enum RouterError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Contract-level error
    #[error("router error: {0}")]
    Contract(#[from] contracts::PipelineError),
}

impl RouterError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
