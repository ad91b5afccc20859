//! Pipeline statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Shared counters updated while the pipeline runs
#[derive(Debug, Default)]
pub struct StatsCollector {
    events_admitted: AtomicU64,
    parse_failures: AtomicU64,
    groups_flushed: AtomicU64,
    batches_delivered: AtomicU64,
    batches_failed: AtomicU64,
}

impl StatsCollector {
    pub fn inc_events_admitted(&self) {
        self.events_admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_parse_failures(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_groups_flushed(&self) {
        self.groups_flushed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_batches_delivered(&self) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_batches_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Freeze the counters into a reportable snapshot
    pub fn snapshot(&self, duration: Duration) -> PipelineStats {
        PipelineStats {
            events_admitted: self.events_admitted.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            groups_flushed: self.groups_flushed.load(Ordering::Relaxed),
            batches_delivered: self.batches_delivered.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            duration,
        }
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Events admitted into the aggregation engine
    pub events_admitted: u64,

    /// Malformed event lines skipped
    pub parse_failures: u64,

    /// Groups handed to the flush path (standalone events included)
    pub groups_flushed: u64,

    /// Batches accepted by every configured sink
    pub batches_delivered: u64,

    /// Batches at least one sink rejected
    pub batches_failed: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineStats {
    /// Events admitted per second
    pub fn events_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_admitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Relay Statistics ===\n");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Events admitted: {}", self.events_admitted);
        println!("  Events/sec: {:.2}", self.events_per_sec());
        println!("  Groups flushed: {}", self.groups_flushed);
        println!("  Batches delivered: {}", self.batches_delivered);
        if self.batches_failed > 0 {
            println!("  Batches with failed sinks: {}", self.batches_failed);
        }
        if self.parse_failures > 0 {
            println!("  Malformed event lines skipped: {}", self.parse_failures);
        }
        println!();
    }
}
