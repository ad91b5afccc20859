//! Batch - Assembler output, Dispatcher input
//!
//! The merged text + payload set produced by one flush.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{GroupKey, InboundEvent};

/// One named byte payload ready for outbound delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    /// Raw bytes (zero-copy clone)
    pub data: Bytes,

    /// Synthesized filename with a kind-appropriate extension
    pub filename: String,
}

impl Payload {
    /// Create a payload from raw bytes and a filename.
    pub fn new(data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The outbound message produced by one flush: text plus the ordered
/// payloads assembled from every event of the flushed group.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Text to send; empty string means no text
    pub text: String,

    /// Payloads in event/attachment order
    pub payloads: Vec<Payload>,
}

impl Batch {
    /// A batch with neither text nor payloads triggers no delivery at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.payloads.is_empty()
    }

    /// Sum of payload sizes in bytes.
    pub fn total_bytes(&self) -> usize {
        self.payloads.iter().map(Payload::len).sum()
    }
}

/// A group handed from the aggregation engine to the flush path.
///
/// Once a `FlushedGroup` exists, its key is no longer present in the live
/// group map; nothing can be appended to it.
#[derive(Debug, Clone)]
pub struct FlushedGroup {
    /// Group key, `None` for a standalone event
    pub key: Option<GroupKey>,

    /// Admitted events in arrival order, deduplicated by event id
    pub events: Vec<InboundEvent>,
}
