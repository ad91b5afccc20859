//! PayloadBuilder - one event into named byte payloads

use tracing::{debug, instrument, warn};

use contracts::{AssetConverter, AttachmentRef, InboundEvent, Payload, SourceClient};

/// The per-event slice of a batch: caption text plus the payloads built from
/// the event's attachments.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    /// Event text or caption
    pub text: Option<String>,

    /// Payloads in attachment order
    pub payloads: Vec<Payload>,
}

/// Builds payloads for one event at a time.
///
/// A fetch or conversion failure is isolated to the offending attachment:
/// it is logged and skipped, the remaining attachments and the event text
/// still go out.
pub struct PayloadBuilder<C, V> {
    client: C,
    converter: V,
}

impl<C, V> PayloadBuilder<C, V>
where
    C: SourceClient + Sync,
    V: AssetConverter + Sync,
{
    /// Create a builder over a source client and a converter.
    pub fn new(client: C, converter: V) -> Self {
        Self { client, converter }
    }

    /// Build the batch fragment for one event.
    #[instrument(
        name = "payload_builder_build",
        skip(self, event),
        fields(event_id = event.event_id, attachments = event.attachments.len())
    )]
    pub async fn build(&self, event: &InboundEvent) -> Fragment {
        let mut payloads = Vec::with_capacity(event.attachments.len());

        for (index, reference) in event.attachments.iter().enumerate() {
            match self.build_payload(event, reference, index).await {
                Ok(payload) => payloads.push(payload),
                Err(e) => {
                    metrics::counter!("relay_attachments_dropped").increment(1);
                    warn!(
                        event_id = event.event_id,
                        asset_id = %reference.asset_id,
                        error = %e,
                        "attachment dropped, continuing with the rest of the event"
                    );
                }
            }
        }

        Fragment {
            text: event.text.clone(),
            payloads,
        }
    }

    async fn build_payload(
        &self,
        event: &InboundEvent,
        reference: &AttachmentRef,
        index: usize,
    ) -> Result<Payload, contracts::RelayError> {
        let raw = self.client.fetch_asset(reference).await?;
        debug!(
            asset_id = %reference.asset_id,
            bytes = raw.len(),
            kind = ?reference.kind,
            "asset fetched"
        );

        let data = if reference.kind.needs_conversion() {
            self.converter.convert(raw, reference.kind).await?
        } else {
            raw
        };

        let filename = format!(
            "{}_{}.{}",
            event.event_id,
            index,
            reference.kind.target_extension()
        );
        Ok(Payload::new(data, filename))
    }
}
