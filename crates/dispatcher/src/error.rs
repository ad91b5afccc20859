//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// One or more sinks failed to accept a batch; the others were still
    /// attempted
    #[error("delivery failed for {} sink(s): {failed:?}", failed.len())]
    Delivery { failed: Vec<String> },

    /// Contract-level error
    #[error("sink error: {0}")]
    Contract(#[from] contracts::RelayError),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
