//! LogSink - logs batch summary via tracing

use tracing::{info, instrument};

use contracts::{Payload, RelayError, SinkClient};

/// Sink that logs batch summaries for debugging and dry runs
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SinkClient for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_deliver",
        skip(self, text, payloads),
        fields(sink = %self.name)
    )]
    async fn deliver(
        &self,
        text: &str,
        payloads: &[Payload],
        silent: bool,
    ) -> Result<(), RelayError> {
        let total_bytes: usize = payloads.iter().map(Payload::len).sum();
        info!(
            sink = %self.name,
            text_len = text.len(),
            payloads = payloads.len(),
            total_bytes,
            silent,
            "batch received"
        );
        Ok(())
    }
}
