//! MediaGroup - aggregation state for one group key

use std::collections::HashSet;

use contracts::{EventId, InboundEvent};

/// Buffered state of one open media group.
///
/// Keeps admitted events in insertion order plus the set of event ids
/// already seen, so a repeated delivery of the same event is idempotent.
#[derive(Debug, Default)]
pub struct MediaGroup {
    ids: HashSet<EventId>,
    events: Vec<InboundEvent>,
}

impl MediaGroup {
    /// Create a group holding its first event.
    pub fn new(first: InboundEvent) -> Self {
        let mut group = Self::default();
        group.admit(first);
        group
    }

    /// Append an event unless its id was already admitted.
    ///
    /// Returns false for a duplicate, which the caller drops silently.
    pub fn admit(&mut self, event: InboundEvent) -> bool {
        if !self.ids.insert(event.event_id) {
            return false;
        }
        self.events.push(event);
        true
    }

    /// Number of admitted events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the group holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consume the group, yielding its events in arrival order.
    pub fn into_events(self) -> Vec<InboundEvent> {
        self.events
    }
}
