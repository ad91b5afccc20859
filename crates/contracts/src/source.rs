//! SourceClient trait - source-platform asset access
//!
//! Defines the abstract interface for fetching raw asset bytes, decoupling
//! payload building from the concrete platform client.

use bytes::Bytes;

use crate::{AttachmentRef, RelayError};

/// Source-platform asset fetcher
///
/// The relay core never talks to the source platform directly; it resolves
/// attachment references through this trait. Implementations report an
/// oversized asset as [`RelayError::AssetTooLarge`] and any transport or
/// client failure as [`RelayError::AssetFetch`]. Either failure is isolated
/// by the caller to the single attachment being fetched.
#[trait_variant::make(SourceClient: Send)]
pub trait LocalSourceClient {
    /// Fetch the raw bytes of one referenced asset.
    ///
    /// # Errors
    /// [`RelayError::AssetTooLarge`] or [`RelayError::AssetFetch`]
    async fn fetch_asset(&self, reference: &AttachmentRef) -> Result<Bytes, RelayError>;
}
