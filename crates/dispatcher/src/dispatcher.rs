//! Dispatcher - fan-out of one batch to every configured sink

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use contracts::{Batch, Payload, SinkClient, SinkSpec};

use crate::error::DispatcherError;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::{create_sink, RelaySink};

/// One configured sink with its client and metrics
pub struct SinkRuntime<S> {
    spec: SinkSpec,
    client: S,
    metrics: Arc<SinkMetrics>,
}

impl<S> SinkRuntime<S> {
    /// Pair a sink spec with its client
    pub fn new(spec: SinkSpec, client: S) -> Self {
        Self {
            spec,
            client,
            metrics: Arc::new(SinkMetrics::new()),
        }
    }
}

/// The dispatcher fanning batches out to all sinks.
///
/// Sinks are independent: size filtering, skipping and failure are decided
/// per sink, and a failing sink never prevents delivery attempts to the
/// remaining ones.
pub struct Dispatcher<S> {
    sinks: Vec<SinkRuntime<S>>,
}

impl Dispatcher<RelaySink> {
    /// Build a dispatcher from sink configuration
    pub fn from_specs(specs: &[SinkSpec]) -> Result<Self, DispatcherError> {
        let mut sinks = Vec::with_capacity(specs.len());
        for spec in specs {
            let client = create_sink(spec)?;
            sinks.push(SinkRuntime::new(spec.clone(), client));
        }
        Ok(Self { sinks })
    }
}

impl<S: SinkClient + Sync> Dispatcher<S> {
    /// Create a dispatcher with custom sink clients (for testing)
    pub fn with_clients(pairs: Vec<(SinkSpec, S)>) -> Self {
        Self {
            sinks: pairs
                .into_iter()
                .map(|(spec, client)| SinkRuntime::new(spec, client))
                .collect(),
        }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.sinks
            .iter()
            .map(|s| (s.spec.name.clone(), s.metrics.snapshot()))
            .collect()
    }

    /// Deliver one batch to every configured sink.
    ///
    /// An empty batch is a logged no-op. Failures are collected and returned
    /// as one aggregate error after all sinks have been attempted.
    #[instrument(
        name = "dispatcher_deliver",
        skip(self, batch),
        fields(payloads = batch.payloads.len(), text_len = batch.text.len())
    )]
    pub async fn deliver(&self, batch: &Batch) -> Result<(), DispatcherError> {
        if batch.is_empty() {
            debug!("batch has neither text nor payloads, nothing to deliver");
            return Ok(());
        }

        let mut failed = Vec::new();
        for sink in &self.sinks {
            match self.deliver_to(sink, batch).await {
                Ok(true) => {
                    sink.metrics.inc_delivered_count();
                    metrics::counter!("relay_batches_delivered").increment(1);
                }
                Ok(false) => sink.metrics.inc_skipped_count(),
                Err(e) => {
                    sink.metrics.inc_failure_count();
                    metrics::counter!("relay_sink_failures").increment(1);
                    error!(sink = %sink.spec.name, error = %e, "delivery failed");
                    failed.push(sink.spec.name.clone());
                    // Continue with the remaining sinks
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DispatcherError::Delivery { failed })
        }
    }

    /// Deliver to one sink. Returns Ok(false) when the sink was skipped
    /// because nothing fit its limits.
    async fn deliver_to(
        &self,
        sink: &SinkRuntime<S>,
        batch: &Batch,
    ) -> Result<bool, contracts::RelayError> {
        let payloads = self.filter_payloads(sink, batch);

        if batch.text.is_empty() && payloads.is_empty() {
            debug!(sink = %sink.spec.name, "nothing deliverable after size filtering, sink skipped");
            return Ok(false);
        }

        sink.client
            .deliver(&batch.text, &payloads, sink.spec.silent)
            .await?;
        Ok(true)
    }

    /// Keep only payloads within this sink's size limit; oversized payloads
    /// are excluded for this sink, never truncated.
    fn filter_payloads(&self, sink: &SinkRuntime<S>, batch: &Batch) -> Vec<Payload> {
        let mut kept = Vec::with_capacity(batch.payloads.len());
        for payload in &batch.payloads {
            if payload.len() as u64 > sink.spec.max_payload_bytes {
                sink.metrics.inc_oversize_count();
                warn!(
                    sink = %sink.spec.name,
                    filename = %payload.filename,
                    size = payload.len(),
                    max = sink.spec.max_payload_bytes,
                    "payload exceeds sink limit, excluded"
                );
            } else {
                kept.push(payload.clone());
            }
        }
        kept
    }
}
