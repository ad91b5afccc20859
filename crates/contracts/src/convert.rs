//! AssetConverter trait - media re-encoding
//!
//! Transforms one raw media encoding into another when the target format is
//! unsupported by the sinks.

use bytes::Bytes;

use crate::{AttachmentKind, RelayError};

/// Stateless media converter
///
/// Kinds that need no conversion pass through unchanged. Implementations of
/// the CPU-bound paths must run off the admission event loop (worker pool /
/// blocking executor) so a slow transcode cannot stall aggregation.
#[trait_variant::make(AssetConverter: Send)]
pub trait LocalAssetConverter {
    /// Convert raw bytes of the given source kind into the sink-supported
    /// target encoding.
    ///
    /// # Errors
    /// Returns [`RelayError::Conversion`]; the caller isolates the failure
    /// to the offending attachment.
    async fn convert(&self, data: Bytes, kind: AttachmentKind) -> Result<Bytes, RelayError>;
}
