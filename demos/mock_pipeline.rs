//! Mock Pipeline Demo
//!
//! Wires the full relay pipeline against in-memory collaborators: a mock
//! source client, a passthrough converter and a log sink. Runs without a
//! source platform, a webhook endpoint or an ffmpeg binary.
//!
//! Run with: cargo run --bin mock_pipeline

use std::sync::Arc;
use std::time::Duration;

use aggregator::{Aggregator, AggregatorConfig};
use assembler::{Assembler, MockConverter, MockSourceClient, PayloadBuilder};
use config_loader::ConfigLoader;
use contracts::{AttachmentKind, AttachmentRef, InboundEvent, Origin, RelayBlueprint};
use dispatcher::Dispatcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mock Relay Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading relay config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        create_test_blueprint()
    };

    // ==== Stage 2: Mock collaborators ====
    let source = MockSourceClient::new()
        .with_asset("album-1.jpg", b"jpeg bytes one".to_vec())
        .with_asset("album-2.jpg", b"jpeg bytes two".to_vec())
        .with_asset("album-3.jpg", b"jpeg bytes three".to_vec())
        .with_asset("clip-1.mp4", b"looping clip bytes".to_vec());

    // ==== Stage 3: Build pipeline components ====
    let assembler = Arc::new(Assembler::new(
        PayloadBuilder::new(source, MockConverter::passthrough()),
        blueprint.relay.origin_template.clone(),
    ));
    let dispatcher = Arc::new(Dispatcher::from_specs(&blueprint.sinks)?);

    let (aggregator, mut flush_rx) = Aggregator::new(AggregatorConfig {
        quiet_window: blueprint.relay.quiet_window(),
        ..Default::default()
    });

    // ==== Stage 4: Flush consumer ====
    let consumer = {
        let assembler = Arc::clone(&assembler);
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            let mut delivered = 0u64;
            while let Some(flushed) = flush_rx.recv().await {
                let batch = assembler.assemble(&flushed.events).await;
                match dispatcher.deliver(&batch).await {
                    Ok(()) => delivered += 1,
                    Err(e) => tracing::warn!(error = %e, "Batch delivery incomplete"),
                }
            }
            delivered
        })
    };

    // ==== Stage 5: Admit demo events ====
    // A three-part album with a duplicate delivery, then a standalone repost
    tracing::info!("Admitting demo events");
    aggregator
        .admit(album_event(1, Some("Vacation album"), "album-1.jpg"))
        .await;
    aggregator.admit(album_event(2, None, "album-2.jpg")).await;
    aggregator.admit(album_event(2, None, "album-2.jpg")).await; // duplicate
    aggregator.admit(album_event(3, None, "album-3.jpg")).await;
    aggregator.admit(forwarded_clip_event()).await;

    // ==== Stage 6: Drain and shut down ====
    tokio::time::sleep(blueprint.relay.quiet_window() + Duration::from_millis(200)).await;
    aggregator.shutdown().await;
    drop(aggregator);

    let delivered = consumer.await?;

    for (name, snapshot) in dispatcher.metrics() {
        tracing::info!(
            sink = %name,
            delivered = snapshot.delivered_count,
            failed = snapshot.failure_count,
            "Sink summary"
        );
    }
    tracing::info!(batches = delivered, "Mock relay demo finished");

    Ok(())
}

fn album_event(id: i64, caption: Option<&str>, asset: &str) -> InboundEvent {
    InboundEvent {
        event_id: id,
        group_key: Some("vacation-album".into()),
        text: caption.map(String::from),
        attachments: vec![AttachmentRef::new(asset, AttachmentKind::Image)],
        origin: None,
    }
}

fn forwarded_clip_event() -> InboundEvent {
    InboundEvent {
        event_id: 10,
        group_key: None,
        text: Some("Look at this clip".to_string()),
        attachments: vec![AttachmentRef::new("clip-1.mp4", AttachmentKind::AnimatedLoop)],
        origin: Some(Origin::Channel {
            title: Some("Demo Channel".to_string()),
            permalink: Some("https://example.test/demo/10".to_string()),
        }),
    }
}

fn create_test_blueprint() -> RelayBlueprint {
    use contracts::*;

    RelayBlueprint {
        version: ConfigVersion::V1,
        relay: RelayOptions {
            quiet_window_ms: 1000,
            origin_template: "Forwarded from ".to_string(),
        },
        source: SourceOptions {
            max_asset_bytes: 8 * 1024 * 1024,
            assets_root: None,
        },
        converter: ConverterOptions::default(),
        sinks: vec![SinkSpec {
            name: "demo".to_string(),
            kind: SinkKind::Log,
            url: None,
            max_payload_bytes: 1024 * 1024,
            silent: false,
        }],
    }
}
