//! Replay Pipeline Demo
//!
//! Runs the relay against assets on the local filesystem: events reference
//! files under a scratch directory and each batch fans out to two log sinks
//! with different payload limits, so the per-sink size filtering is visible
//! in the output.
//!
//! Run with: cargo run --bin replay_pipeline

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use aggregator::{Aggregator, AggregatorConfig};
use assembler::{Assembler, FsSourceClient, PayloadBuilder};
use contracts::{AttachmentKind, AttachmentRef, InboundEvent, RelayBlueprint};
use converter::FfmpegConverter;
use dispatcher::Dispatcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Replay Relay Demo");

    // ==== Stage 1: Scratch assets ====
    let assets_root = std::env::temp_dir().join("media-relay-replay-demo");
    std::fs::create_dir_all(&assets_root)?;
    std::fs::write(assets_root.join("city.jpg"), vec![0xAAu8; 2048])?;
    std::fs::write(assets_root.join("harbor.jpg"), vec![0xBBu8; 512])?;
    std::fs::write(assets_root.join("timelapse.mp4"), vec![0xCCu8; 8192])?;
    tracing::info!(root = %assets_root.display(), "Demo assets written");

    let blueprint = create_demo_blueprint(assets_root.clone());

    // ==== Stage 2: Build pipeline components ====
    let source = FsSourceClient::new(assets_root, blueprint.source.max_asset_bytes);
    let scratch_dir = std::env::temp_dir().join("media-relay-replay-demo-scratch");
    let assembler = Arc::new(Assembler::new(
        PayloadBuilder::new(source, FfmpegConverter::new(scratch_dir)),
        blueprint.relay.origin_template.clone(),
    ));
    let dispatcher = Arc::new(Dispatcher::from_specs(&blueprint.sinks)?);

    let (aggregator, mut flush_rx) = Aggregator::new(AggregatorConfig {
        quiet_window: blueprint.relay.quiet_window(),
        ..Default::default()
    });

    // ==== Stage 3: Flush consumer ====
    let consumer = {
        let assembler = Arc::clone(&assembler);
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            while let Some(flushed) = flush_rx.recv().await {
                let batch = assembler.assemble(&flushed.events).await;
                if let Err(e) = dispatcher.deliver(&batch).await {
                    tracing::warn!(error = %e, "Batch delivery incomplete");
                }
            }
        })
    };

    // ==== Stage 4: Admit demo events ====
    // A two-photo album; city.jpg only fits the archive sink's limit
    tracing::info!("Admitting demo events");
    aggregator
        .admit(photo_event(1, "morning-walk", Some("Morning walk"), "city.jpg"))
        .await;
    aggregator
        .admit(photo_event(2, "morning-walk", None, "harbor.jpg"))
        .await;

    // Standalone video, delivered without any debounce delay
    aggregator
        .admit(InboundEvent {
            event_id: 3,
            group_key: None,
            text: Some("Timelapse from the roof".to_string()),
            attachments: vec![AttachmentRef::new("timelapse.mp4", AttachmentKind::Video)],
            origin: None,
        })
        .await;

    // ==== Stage 5: Drain and shut down ====
    tokio::time::sleep(blueprint.relay.quiet_window() + Duration::from_millis(200)).await;
    aggregator.shutdown().await;
    drop(aggregator);
    consumer.await?;

    for (name, snapshot) in dispatcher.metrics() {
        tracing::info!(
            sink = %name,
            delivered = snapshot.delivered_count,
            skipped = snapshot.skipped_count,
            oversize = snapshot.oversize_count,
            "Sink summary"
        );
    }
    tracing::info!("Replay relay demo finished");

    Ok(())
}

fn photo_event(id: i64, key: &str, caption: Option<&str>, asset: &str) -> InboundEvent {
    InboundEvent {
        event_id: id,
        group_key: Some(key.into()),
        text: caption.map(String::from),
        attachments: vec![AttachmentRef::new(asset, AttachmentKind::Image)],
        origin: None,
    }
}

fn create_demo_blueprint(assets_root: PathBuf) -> RelayBlueprint {
    use contracts::*;

    RelayBlueprint {
        version: ConfigVersion::V1,
        relay: RelayOptions {
            quiet_window_ms: 1000,
            origin_template: "Forwarded from ".to_string(),
        },
        source: SourceOptions {
            max_asset_bytes: 4 * 1024 * 1024,
            assets_root: Some(assets_root),
        },
        converter: ConverterOptions::default(),
        sinks: vec![
            // Tight limit: the larger photo is excluded here
            SinkSpec {
                name: "preview".to_string(),
                kind: SinkKind::Log,
                url: None,
                max_payload_bytes: 1024,
                silent: true,
            },
            SinkSpec {
                name: "archive".to_string(),
                kind: SinkKind::Log,
                url: None,
                max_payload_bytes: 10 * 1024 * 1024,
                silent: false,
            },
        ],
    }
}
