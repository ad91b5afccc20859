//! # Aggregator
//!
//! Debounced event grouping engine.
//!
//! Responsibilities:
//! - Buffer related events under a shared group key
//! - Deduplicate repeated deliveries by event id
//! - Trigger exactly one downstream flush per group after a quiet window
//! - Pass standalone events through without delay
//!
//! ## Usage Example
//!
//! ```ignore
//! use aggregator::{Aggregator, AggregatorConfig};
//!
//! let (aggregator, mut flush_rx) = Aggregator::new(AggregatorConfig::default());
//!
//! aggregator.admit(event).await;
//!
//! while let Some(flushed) = flush_rx.recv().await {
//!     // Assemble and dispatch the batch
//! }
//! ```

mod engine;
mod group;

pub use contracts::FlushedGroup;
pub use engine::{Aggregator, AggregatorConfig};
pub use group::MediaGroup;
