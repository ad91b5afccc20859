//! Aggregation engine - group map, debounce timers, atomic flush handoff

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use contracts::{FlushedGroup, GroupKey, InboundEvent};

use crate::group::MediaGroup;

/// Aggregator configuration
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Quiet window measured from the first event of a group
    pub quiet_window: Duration,

    /// Capacity of the flush channel
    pub flush_capacity: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            quiet_window: Duration::from_secs(5),
            flush_capacity: 64,
        }
    }
}

/// The debounced grouping engine.
///
/// Owns the live group map; all map mutation happens under one lock held
/// only for in-memory bookkeeping, never across an await. One timer task is
/// armed per group on creation and never re-armed, bounding aggregation
/// latency to a single quiet window regardless of burst size. A flushed
/// group is removed from the map before its events leave the engine, so no
/// late event can attach to it.
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<Inner>,
}

struct Inner {
    quiet_window: Duration,
    flush_tx: mpsc::Sender<FlushedGroup>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    groups: HashMap<GroupKey, MediaGroup>,
    timers: JoinSet<()>,
}

impl Aggregator {
    /// Create an aggregator and the receiving end of its flush stream.
    pub fn new(config: AggregatorConfig) -> (Self, mpsc::Receiver<FlushedGroup>) {
        let (flush_tx, flush_rx) = mpsc::channel(config.flush_capacity);
        let aggregator = Self {
            inner: Arc::new(Inner {
                quiet_window: config.quiet_window,
                flush_tx,
                state: Mutex::new(State::default()),
            }),
        };
        (aggregator, flush_rx)
    }

    /// Admit one inbound event.
    ///
    /// Standalone events (no group key) bypass buffering and flush
    /// immediately; grouped events wait out their group's quiet window.
    #[instrument(
        name = "aggregator_admit",
        skip(self, event),
        fields(event_id = event.event_id, group = event.group_key.as_deref())
    )]
    pub async fn admit(&self, event: InboundEvent) {
        metrics::counter!("relay_events_admitted").increment(1);

        match event.group_key.clone() {
            None => self.flush_standalone(event).await,
            Some(key) => self.admit_grouped(key, event),
        }
    }

    /// Number of groups currently waiting out their quiet window.
    pub fn open_groups(&self) -> usize {
        self.inner.lock_state().groups.len()
    }

    /// Abort pending timers and drop buffered groups.
    ///
    /// Groups still inside their quiet window are lost; there is no
    /// cross-restart durability for buffered events.
    pub async fn shutdown(&self) {
        let (mut timers, pending) = {
            let mut state = self.inner.lock_state();
            let pending = state.groups.len();
            state.groups.clear();
            (std::mem::take(&mut state.timers), pending)
        };
        timers.shutdown().await;
        if pending > 0 {
            warn!(groups = pending, "buffered groups dropped on shutdown");
        }
    }

    async fn flush_standalone(&self, event: InboundEvent) {
        debug!(event_id = event.event_id, "standalone event, flushing immediately");
        let flushed = FlushedGroup {
            key: None,
            events: vec![event],
        };
        if self.inner.flush_tx.send(flushed).await.is_err() {
            warn!("flush channel closed, standalone event dropped");
        }
    }

    fn admit_grouped(&self, key: GroupKey, event: InboundEvent) {
        let mut state = self.inner.lock_state();

        // Reap timer tasks that already completed
        while state.timers.try_join_next().is_some() {}

        match state.groups.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get_mut().admit(event) {
                    debug!(group = %key, events = entry.get().len(), "event appended to open group");
                } else {
                    metrics::counter!("relay_duplicate_events").increment(1);
                    debug!(group = %key, "duplicate delivery dropped");
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(MediaGroup::new(event));
                // Armed exactly once per group; later arrivals never reset it
                let inner = Arc::clone(&self.inner);
                state.timers.spawn(async move {
                    tokio::time::sleep(inner.quiet_window).await;
                    Inner::flush_group(&inner, key).await;
                });
            }
        }
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pop the group atomically, then hand it downstream outside the lock.
    async fn flush_group(inner: &Arc<Inner>, key: GroupKey) {
        let group = {
            let mut state = inner.lock_state();
            state.groups.remove(&key)
        };

        let Some(group) = group else {
            // Shut down while the timer was pending
            return;
        };

        metrics::counter!("relay_groups_flushed").increment(1);
        info!(group = %key, events = group.len(), "quiet window elapsed, flushing group");

        let flushed = FlushedGroup {
            key: Some(key),
            events: group.into_events(),
        };
        if inner.flush_tx.send(flushed).await.is_err() {
            warn!("flush channel closed, group dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::advance;

    const WINDOW: Duration = Duration::from_secs(5);

    fn config() -> AggregatorConfig {
        AggregatorConfig {
            quiet_window: WINDOW,
            flush_capacity: 16,
        }
    }

    fn grouped(id: i64, key: &str) -> InboundEvent {
        InboundEvent {
            event_id: id,
            group_key: Some(key.into()),
            text: None,
            attachments: vec![],
            origin: None,
        }
    }

    fn standalone(id: i64) -> InboundEvent {
        InboundEvent {
            event_id: id,
            group_key: None,
            text: Some("hi".to_string()),
            attachments: vec![],
            origin: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_standalone_flushes_without_delay() {
        let (aggregator, mut rx) = Aggregator::new(config());

        aggregator.admit(standalone(1)).await;

        let flushed = rx.try_recv().expect("standalone must flush immediately");
        assert!(flushed.key.is_none());
        assert_eq!(flushed.events.len(), 1);
        assert_eq!(flushed.events[0].event_id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_group_flushes_once_after_window() {
        let (aggregator, mut rx) = Aggregator::new(config());

        aggregator.admit(grouped(1, "g1")).await;
        aggregator.admit(grouped(2, "g1")).await;
        aggregator.admit(grouped(3, "g1")).await;

        // Nothing before the window elapses
        advance(WINDOW - Duration::from_millis(1)).await;
        tokio::task::yield_now().await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        advance(Duration::from_millis(2)).await;
        let flushed = rx.recv().await.unwrap();
        assert_eq!(flushed.key.as_deref(), Some("g1"));
        let ids: Vec<_> = flushed.events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        // Exactly one flush, and the group is gone from the live map
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(aggregator.open_groups(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_delivery_is_idempotent() {
        let (aggregator, mut rx) = Aggregator::new(config());

        aggregator.admit(grouped(1, "g1")).await;
        aggregator.admit(grouped(1, "g1")).await;

        advance(WINDOW + Duration::from_millis(1)).await;
        let flushed = rx.recv().await.unwrap();
        assert_eq!(flushed.events.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_measured_from_first_event() {
        let (aggregator, mut rx) = Aggregator::new(config());

        aggregator.admit(grouped(1, "g1")).await;
        advance(WINDOW - Duration::from_secs(1)).await;
        // A late arrival must not push the deadline out
        aggregator.admit(grouped(2, "g1")).await;

        advance(Duration::from_secs(1)).await;
        let flushed = rx.recv().await.unwrap();
        let ids: Vec<_> = flushed.events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_reuse_after_flush_starts_new_group() {
        let (aggregator, mut rx) = Aggregator::new(config());

        aggregator.admit(grouped(1, "g1")).await;
        advance(WINDOW + Duration::from_millis(1)).await;
        let first = rx.recv().await.unwrap();
        assert_eq!(first.events.len(), 1);

        // Same key again: a brand-new group with its own window
        aggregator.admit(grouped(2, "g1")).await;
        assert_eq!(aggregator.open_groups(), 1);

        advance(WINDOW + Duration::from_millis(1)).await;
        let second = rx.recv().await.unwrap();
        let ids: Vec<_> = second.events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_groups_flush_separately() {
        let (aggregator, mut rx) = Aggregator::new(config());

        aggregator.admit(grouped(1, "g1")).await;
        advance(Duration::from_secs(2)).await;
        aggregator.admit(grouped(2, "g2")).await;

        advance(WINDOW - Duration::from_secs(2) + Duration::from_millis(1)).await;
        let first = rx.recv().await.unwrap();
        assert_eq!(first.key.as_deref(), Some("g1"));

        advance(Duration::from_secs(2)).await;
        let second = rx.recv().await.unwrap();
        assert_eq!(second.key.as_deref(), Some("g2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_pending_groups() {
        let (aggregator, mut rx) = Aggregator::new(config());

        aggregator.admit(grouped(1, "g1")).await;
        aggregator.shutdown().await;

        assert_eq!(aggregator.open_groups(), 0);
        advance(WINDOW * 2).await;
        tokio::task::yield_now().await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
