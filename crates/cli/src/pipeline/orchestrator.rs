//! Pipeline orchestrator - coordinates all components.
//!
//! Wires the inbound event stream through the aggregation engine into the
//! assembler and dispatcher, processing each flushed group on its own task
//! so one slow batch cannot delay delivery for other groups.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use aggregator::{Aggregator, AggregatorConfig};
use assembler::{Assembler, FsSourceClient, PayloadBuilder};
use contracts::{FlushedGroup, InboundEvent, RelayBlueprint};
use converter::FfmpegConverter;
use dispatcher::{Dispatcher, RelaySink};

use super::stats::StatsCollector;
use super::PipelineStats;

/// Extra wait after the event stream ends so open quiet windows can elapse
const DRAIN_GRACE: Duration = Duration::from_millis(200);

type RelayAssembler = Assembler<FsSourceClient, FfmpegConverter>;
type RelayDispatcher = Dispatcher<RelaySink>;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The relay blueprint configuration
    pub blueprint: RelayBlueprint,

    /// Event stream path (None = stdin)
    pub events_path: Option<PathBuf>,

    /// Delay between replayed events
    pub event_interval: Duration,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let assembler = Arc::new(Self::build_assembler(blueprint));
        let dispatcher = Arc::new(
            Dispatcher::from_specs(&blueprint.sinks).context("Failed to create sinks")?,
        );
        info!(sinks = blueprint.sinks.len(), "Dispatcher ready");

        let stats = Arc::new(StatsCollector::default());

        let (aggregator, flush_rx) = Aggregator::new(AggregatorConfig {
            quiet_window: blueprint.relay.quiet_window(),
            ..Default::default()
        });

        let consumer = tokio::spawn(consume_flushes(
            flush_rx,
            Arc::clone(&assembler),
            Arc::clone(&dispatcher),
            Arc::clone(&stats),
        ));

        self.feed_events(&aggregator, &stats).await?;

        // Let open quiet windows elapse so buffered groups still flush
        if aggregator.open_groups() > 0 {
            let drain = blueprint.relay.quiet_window() + DRAIN_GRACE;
            info!(
                groups = aggregator.open_groups(),
                wait_ms = drain.as_millis() as u64,
                "event stream ended, draining open groups"
            );
            tokio::time::sleep(drain).await;
        }

        aggregator.shutdown().await;
        drop(aggregator);
        consumer.await.context("flush consumer task failed")?;

        for (name, snapshot) in dispatcher.metrics() {
            info!(
                sink = %name,
                delivered = snapshot.delivered_count,
                failed = snapshot.failure_count,
                skipped = snapshot.skipped_count,
                oversize = snapshot.oversize_count,
                "Sink summary"
            );
        }

        Ok(stats.snapshot(start_time.elapsed()))
    }

    fn build_assembler(blueprint: &RelayBlueprint) -> RelayAssembler {
        let scratch_dir = blueprint
            .converter
            .scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("media-relay"));
        let converter = match &blueprint.converter.ffmpeg_path {
            Some(path) => FfmpegConverter::with_binary(path.clone(), scratch_dir),
            None => FfmpegConverter::new(scratch_dir),
        };

        let assets_root = blueprint
            .source
            .assets_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let source = FsSourceClient::new(assets_root, blueprint.source.max_asset_bytes);

        Assembler::new(
            PayloadBuilder::new(source, converter),
            blueprint.relay.origin_template.clone(),
        )
    }

    async fn feed_events(&self, aggregator: &Aggregator, stats: &StatsCollector) -> Result<()> {
        match &self.config.events_path {
            Some(path) => {
                info!(events = %path.display(), "Replaying events from file");
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open event stream {}", path.display()))?;
                self.feed_from(BufReader::new(file), aggregator, stats)
                    .await
            }
            None => {
                info!("Reading events from stdin");
                self.feed_from(BufReader::new(tokio::io::stdin()), aggregator, stats)
                    .await
            }
        }
    }

    async fn feed_from<R: AsyncBufRead + Unpin>(
        &self,
        reader: R,
        aggregator: &Aggregator,
        stats: &StatsCollector,
    ) -> Result<()> {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<InboundEvent>(line) {
                Ok(event) => {
                    stats.inc_events_admitted();
                    aggregator.admit(event).await;
                }
                Err(e) => {
                    stats.inc_parse_failures();
                    warn!(error = %e, "Skipping malformed event line");
                }
            }
            if !self.config.event_interval.is_zero() {
                tokio::time::sleep(self.config.event_interval).await;
            }
        }
        Ok(())
    }
}

/// Consume flushed groups, assembling and delivering each on its own task.
async fn consume_flushes(
    mut flush_rx: mpsc::Receiver<FlushedGroup>,
    assembler: Arc<RelayAssembler>,
    dispatcher: Arc<RelayDispatcher>,
    stats: Arc<StatsCollector>,
) {
    let mut in_flight = JoinSet::new();

    while let Some(flushed) = flush_rx.recv().await {
        stats.inc_groups_flushed();

        let assembler = Arc::clone(&assembler);
        let dispatcher = Arc::clone(&dispatcher);
        let stats = Arc::clone(&stats);
        in_flight.spawn(async move {
            let batch = assembler.assemble(&flushed.events).await;
            match dispatcher.deliver(&batch).await {
                Ok(()) => stats.inc_batches_delivered(),
                Err(e) => {
                    stats.inc_batches_failed();
                    warn!(
                        group = flushed.key.as_deref(),
                        error = %e,
                        "Batch delivery incomplete"
                    );
                }
            }
        });

        // Reap finished deliveries without blocking admission of new flushes
        while in_flight.try_join_next().is_some() {}
    }

    // Channel closed: wait for in-flight deliveries to finish
    while in_flight.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{RelayOptions, SinkKind, SinkSpec, SourceOptions};

    fn log_blueprint(assets_root: PathBuf) -> RelayBlueprint {
        RelayBlueprint {
            version: Default::default(),
            relay: RelayOptions {
                quiet_window_ms: 50,
                ..Default::default()
            },
            source: SourceOptions {
                max_asset_bytes: 1024 * 1024,
                assets_root: Some(assets_root),
            },
            converter: Default::default(),
            sinks: vec![SinkSpec {
                name: "debug".to_string(),
                kind: SinkKind::Log,
                url: None,
                max_payload_bytes: 1024 * 1024,
                silent: false,
            }],
        }
    }

    #[tokio::test]
    async fn test_replay_file_through_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"one").unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"two").unwrap();

        let events = dir.path().join("events.jsonl");
        std::fs::write(
            &events,
            concat!(
                r#"{"event_id":1,"group_key":"g","text":"hi","attachments":[{"asset_id":"a.jpg","kind":"image"}]}"#,
                "\n",
                r#"{"event_id":2,"group_key":"g","attachments":[{"asset_id":"b.jpg","kind":"image"}]}"#,
                "\n",
                "not json\n",
                r#"{"event_id":3,"text":"solo"}"#,
                "\n",
            ),
        )
        .unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            blueprint: log_blueprint(dir.path().to_path_buf()),
            events_path: Some(events),
            event_interval: Duration::ZERO,
            metrics_port: None,
        });

        let stats = pipeline.run().await.unwrap();
        assert_eq!(stats.events_admitted, 3);
        assert_eq!(stats.parse_failures, 1);
        // One album batch plus one standalone batch
        assert_eq!(stats.groups_flushed, 2);
        assert_eq!(stats.batches_delivered, 2);
        assert_eq!(stats.batches_failed, 0);
    }
}
