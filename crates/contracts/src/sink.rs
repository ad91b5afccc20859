//! SinkClient trait - Dispatcher output interface
//!
//! Defines the abstract interface for delivery targets.

use crate::{Payload, RelayError};

/// Outbound delivery trait
///
/// All sink implementations must implement this trait. The dispatcher
/// guarantees that every payload handed to `deliver` fits the sink's
/// configured size limit.
#[trait_variant::make(SinkClient: Send)]
pub trait LocalSinkClient {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one outbound message.
    ///
    /// # Errors
    /// Returns [`RelayError::SinkDelivery`]; the caller treats any failure
    /// as "this sink failed" without depending on further structure.
    async fn deliver(
        &self,
        text: &str,
        payloads: &[Payload],
        silent: bool,
    ) -> Result<(), RelayError>;
}
