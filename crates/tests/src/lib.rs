//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约冒烟测试
//! - 模拟 e2e 管道测试（无需源平台或 webhook）

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // Verify the contracts crate is usable as the shared ICD
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_blueprint_loads_from_toml() {
        let config = r#"
[relay]
quiet_window_ms = 1000

[[sinks]]
name = "main"
kind = "webhook"
url = "https://example.test/hook"
max_payload_bytes = 1048576

[[sinks]]
name = "debug"
kind = "log"
"#;
        let blueprint =
            config_loader::ConfigLoader::load_from_str(config, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(blueprint.sinks.len(), 2);

        // The dispatcher accepts the loaded sink specs as-is
        let dispatcher = dispatcher::Dispatcher::from_specs(&blueprint.sinks);
        assert!(dispatcher.is_ok());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use aggregator::{Aggregator, AggregatorConfig};
    use assembler::{Assembler, MockConverter, MockSourceClient, PayloadBuilder};
    use contracts::{
        AttachmentKind, AttachmentRef, InboundEvent, Payload, RelayError, SinkClient, SinkKind,
        SinkSpec,
    };
    use dispatcher::Dispatcher;
    use tokio::time::advance;

    const WINDOW: Duration = Duration::from_secs(5);

    /// Recording sink: every accepted delivery as (text, filenames, silent)
    #[derive(Clone)]
    struct RecordingSink {
        name: String,
        calls: Arc<Mutex<Vec<(String, Vec<String>, bool)>>>,
    }

    impl RecordingSink {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn deliveries(&self) -> Vec<(String, Vec<String>, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SinkClient for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn deliver(
            &self,
            text: &str,
            payloads: &[Payload],
            silent: bool,
        ) -> Result<(), RelayError> {
            self.calls.lock().unwrap().push((
                text.to_string(),
                payloads.iter().map(|p| p.filename.clone()).collect(),
                silent,
            ));
            Ok(())
        }
    }

    fn sink_spec(name: &str, max_payload_bytes: u64) -> SinkSpec {
        SinkSpec {
            name: name.to_string(),
            kind: SinkKind::Log,
            url: None,
            max_payload_bytes,
            silent: false,
        }
    }

    fn grouped_event(id: i64, key: &str, caption: Option<&str>, asset: &str) -> InboundEvent {
        InboundEvent {
            event_id: id,
            group_key: Some(key.into()),
            text: caption.map(String::from),
            attachments: vec![AttachmentRef::new(asset, AttachmentKind::Image)],
            origin: None,
        }
    }

    fn pipeline(
        source: MockSourceClient,
        sinks: Vec<(SinkSpec, RecordingSink)>,
    ) -> (
        Aggregator,
        tokio::sync::mpsc::Receiver<contracts::FlushedGroup>,
        Assembler<MockSourceClient, MockConverter>,
        Dispatcher<RecordingSink>,
    ) {
        let (aggregator, flush_rx) = Aggregator::new(AggregatorConfig {
            quiet_window: WINDOW,
            flush_capacity: 16,
        });
        let assembler = Assembler::new(
            PayloadBuilder::new(source, MockConverter::passthrough()),
            "Forwarded from ",
        );
        let dispatcher = Dispatcher::with_clients(sinks);
        (aggregator, flush_rx, assembler, dispatcher)
    }

    /// End-to-end: grouped events -> Aggregator -> Assembler -> Dispatcher
    ///
    /// Three events share one group key inside the quiet window; exactly one
    /// batch reaches the sink, content in arrival order, duplicate dropped.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_album_becomes_one_batch() {
        let source = MockSourceClient::new()
            .with_asset("p1", b"one".to_vec())
            .with_asset("p2", b"two".to_vec())
            .with_asset("p3", b"three".to_vec());
        let sink = RecordingSink::new("main");
        let (aggregator, mut flush_rx, assembler, dispatcher) = pipeline(
            source,
            vec![(sink_spec("main", 1024 * 1024), sink.clone())],
        );

        aggregator.admit(grouped_event(1, "album", Some("hi"), "p1")).await;
        aggregator.admit(grouped_event(2, "album", None, "p2")).await;
        // Duplicate delivery of event 2
        aggregator.admit(grouped_event(2, "album", None, "p2")).await;
        aggregator.admit(grouped_event(3, "album", None, "p3")).await;

        advance(WINDOW + Duration::from_millis(1)).await;
        let flushed = flush_rx.recv().await.unwrap();
        assert_eq!(flushed.events.len(), 3);

        let batch = assembler.assemble(&flushed.events).await;
        dispatcher.deliver(&batch).await.unwrap();

        let deliveries = sink.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "hi");
        assert_eq!(deliveries[0].1, vec!["1_0.jpg", "2_0.jpg", "3_0.jpg"]);

        // No second flush for the same group
        aggregator.shutdown().await;
        drop(aggregator);
        assert!(flush_rx.recv().await.is_none());
    }

    /// A standalone event flushes without waiting out any window.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_standalone_event_immediate() {
        let source = MockSourceClient::new().with_asset("photo", b"bytes".to_vec());
        let sink = RecordingSink::new("main");
        let (aggregator, mut flush_rx, assembler, dispatcher) = pipeline(
            source,
            vec![(sink_spec("main", 1024), sink.clone())],
        );

        let event = InboundEvent {
            event_id: 9,
            group_key: None,
            text: Some("hello".to_string()),
            attachments: vec![AttachmentRef::new("photo", AttachmentKind::Image)],
            origin: None,
        };
        aggregator.admit(event).await;

        // No time advance needed
        let flushed = flush_rx.try_recv().expect("standalone flush must be immediate");
        let batch = assembler.assemble(&flushed.events).await;
        dispatcher.deliver(&batch).await.unwrap();

        let deliveries = sink.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "hello");
        assert_eq!(deliveries[0].1, vec!["9_0.jpg"]);
    }

    /// A payload over one sink's limit is excluded there but still reaches a
    /// sink with a higher limit; the small sink still gets the text.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_size_limits_split_across_sinks() {
        let source = MockSourceClient::new().with_asset("big", vec![0u8; 2 * 1024 * 1024]);
        let small = RecordingSink::new("small");
        let large = RecordingSink::new("large");
        let (aggregator, mut flush_rx, assembler, dispatcher) = pipeline(
            source,
            vec![
                (sink_spec("small", 1024 * 1024), small.clone()),
                (sink_spec("large", 10 * 1024 * 1024), large.clone()),
            ],
        );

        let event = InboundEvent {
            event_id: 1,
            group_key: None,
            text: Some("hi".to_string()),
            attachments: vec![AttachmentRef::new("big", AttachmentKind::Image)],
            origin: None,
        };
        aggregator.admit(event).await;

        let flushed = flush_rx.try_recv().unwrap();
        let batch = assembler.assemble(&flushed.events).await;
        dispatcher.deliver(&batch).await.unwrap();

        let small_seen = small.deliveries();
        assert_eq!(small_seen[0].0, "hi");
        assert!(small_seen[0].1.is_empty());

        let large_seen = large.deliveries();
        assert_eq!(large_seen[0].1, vec!["1_0.jpg"]);
    }

    /// A failed fetch drops one attachment without holding up the batch.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_broken_asset_does_not_block_batch() {
        let source = MockSourceClient::new()
            .with_asset("good", b"bytes".to_vec())
            .with_failure("broken");
        let sink = RecordingSink::new("main");
        let (aggregator, mut flush_rx, assembler, dispatcher) = pipeline(
            source,
            vec![(sink_spec("main", 1024), sink.clone())],
        );

        aggregator.admit(grouped_event(1, "g", Some("hi"), "broken")).await;
        aggregator.admit(grouped_event(2, "g", None, "good")).await;

        advance(WINDOW + Duration::from_millis(1)).await;
        let flushed = flush_rx.recv().await.unwrap();
        let batch = assembler.assemble(&flushed.events).await;
        dispatcher.deliver(&batch).await.unwrap();

        let deliveries = sink.deliveries();
        assert_eq!(deliveries[0].0, "hi");
        assert_eq!(deliveries[0].1, vec!["2_0.jpg"]);
    }
}
