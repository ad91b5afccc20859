//! Sink implementations

mod log;
mod webhook;

pub use log::LogSink;
pub use webhook::WebhookSink;

use contracts::{Payload, RelayError, SinkClient, SinkKind, SinkSpec};

use crate::error::DispatcherError;

/// A configured sink of any supported kind.
///
/// Closed enum so the dispatcher stays generic over `SinkClient` while
/// production configs can mix sink kinds freely.
pub enum RelaySink {
    /// HTTP webhook endpoint
    Webhook(WebhookSink),
    /// Log-only sink
    Log(LogSink),
}

impl SinkClient for RelaySink {
    fn name(&self) -> &str {
        match self {
            Self::Webhook(sink) => sink.name(),
            Self::Log(sink) => sink.name(),
        }
    }

    async fn deliver(
        &self,
        text: &str,
        payloads: &[Payload],
        silent: bool,
    ) -> Result<(), RelayError> {
        match self {
            Self::Webhook(sink) => sink.deliver(text, payloads, silent).await,
            Self::Log(sink) => sink.deliver(text, payloads, silent).await,
        }
    }
}

/// Create a sink client from configuration
pub fn create_sink(spec: &SinkSpec) -> Result<RelaySink, DispatcherError> {
    match spec.kind {
        SinkKind::Webhook => {
            let url = spec.url.clone().filter(|u| !u.is_empty()).ok_or_else(|| {
                DispatcherError::sink_creation(&spec.name, "webhook sink requires a url")
            })?;
            Ok(RelaySink::Webhook(WebhookSink::new(&spec.name, url)))
        }
        SinkKind::Log => Ok(RelaySink::Log(LogSink::new(&spec.name))),
    }
}
