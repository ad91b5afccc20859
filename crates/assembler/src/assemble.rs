//! Assembler - fold flushed events into one outbound Batch

use tracing::instrument;

use contracts::{AssetConverter, Batch, InboundEvent, SourceClient};

use crate::builder::PayloadBuilder;
use crate::origin::origin_prefix;

/// Turns the events of one flush into a single `Batch`.
///
/// Events are processed in arrival order; payload lists concatenate, the
/// last non-empty caption becomes the batch text, and the origin prefix of
/// the first event (if any) is prepended, separated by a blank line.
pub struct Assembler<C, V> {
    builder: PayloadBuilder<C, V>,
    origin_template: String,
}

impl<C, V> Assembler<C, V>
where
    C: SourceClient + Sync,
    V: AssetConverter + Sync,
{
    /// Create an assembler with the configured origin template.
    pub fn new(builder: PayloadBuilder<C, V>, origin_template: impl Into<String>) -> Self {
        Self {
            builder,
            origin_template: origin_template.into(),
        }
    }

    /// Assemble a batch from the events of one flush.
    #[instrument(name = "assembler_assemble", skip(self, events), fields(events = events.len()))]
    pub async fn assemble(&self, events: &[InboundEvent]) -> Batch {
        let mut text = String::new();
        let mut payloads = Vec::new();

        for event in events {
            let fragment = self.builder.build(event).await;
            if let Some(caption) = fragment.text {
                if !caption.is_empty() {
                    text = caption;
                }
            }
            payloads.extend(fragment.payloads);
        }

        if let Some(prefix) = events
            .first()
            .and_then(|event| origin_prefix(event, &self.origin_template))
        {
            text = if text.is_empty() {
                prefix
            } else {
                format!("{prefix}\n\n{text}")
            };
        }

        Batch { text, payloads }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockConverter, MockSourceClient};
    use contracts::{AttachmentKind, AttachmentRef, Origin};

    fn event(id: i64, text: Option<&str>, assets: &[&str]) -> InboundEvent {
        InboundEvent {
            event_id: id,
            group_key: Some("g1".into()),
            text: text.map(String::from),
            attachments: assets
                .iter()
                .map(|a| AttachmentRef::new(*a, AttachmentKind::Image))
                .collect(),
            origin: None,
        }
    }

    fn assembler_for(client: MockSourceClient) -> Assembler<MockSourceClient, MockConverter> {
        Assembler::new(
            PayloadBuilder::new(client, MockConverter::passthrough()),
            "Forwarded from ",
        )
    }

    #[tokio::test]
    async fn test_payloads_keep_arrival_order() {
        let client = MockSourceClient::new()
            .with_asset("a", b"1".to_vec())
            .with_asset("b", b"2".to_vec())
            .with_asset("c", b"3".to_vec());
        let assembler = assembler_for(client);

        let events = vec![
            event(1, None, &["a"]),
            event(2, None, &["b"]),
            event(3, None, &["c"]),
        ];
        let batch = assembler.assemble(&events).await;

        let names: Vec<_> = batch.payloads.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(names, vec!["1_0.jpg", "2_0.jpg", "3_0.jpg"]);
    }

    #[tokio::test]
    async fn test_last_nonempty_caption_wins() {
        let assembler = assembler_for(MockSourceClient::new());

        let events = vec![
            event(1, Some("first"), &[]),
            event(2, None, &[]),
            event(3, Some("last"), &[]),
        ];
        let batch = assembler.assemble(&events).await;

        assert_eq!(batch.text, "last");
    }

    #[tokio::test]
    async fn test_origin_prefix_from_first_event() {
        let assembler = assembler_for(MockSourceClient::new());

        let mut first = event(1, Some("hi"), &[]);
        first.origin = Some(Origin::Channel {
            title: Some("News".to_string()),
            permalink: Some("https://t.me/news/1".to_string()),
        });
        let events = vec![first, event(2, None, &[])];
        let batch = assembler.assemble(&events).await;

        assert_eq!(batch.text, "Forwarded from [News](https://t.me/news/1)\n\nhi");
    }

    #[tokio::test]
    async fn test_prefix_alone_when_no_caption() {
        let assembler = assembler_for(MockSourceClient::new());

        let mut only = event(1, None, &[]);
        only.origin = Some(Origin::User {
            first_name: Some("Alice".to_string()),
            profile_link: None,
        });
        let batch = assembler.assemble(&[only]).await;

        assert_eq!(batch.text, "Forwarded from Alice");
        assert!(batch.payloads.is_empty());
    }
}
