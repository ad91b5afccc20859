//! FsSourceClient - file-backed source for replay/offline runs
//!
//! Resolves asset ids as paths under a root directory, enforcing the
//! configured source-side size limit before reading.

use std::path::PathBuf;

use bytes::Bytes;
use tracing::{debug, instrument};

use contracts::{AttachmentRef, RelayError, SourceClient};

/// Source client reading asset bytes from the local filesystem.
pub struct FsSourceClient {
    root: PathBuf,
    max_asset_bytes: u64,
}

impl FsSourceClient {
    /// Create a client rooted at `root` with the given size limit.
    pub fn new(root: impl Into<PathBuf>, max_asset_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_asset_bytes,
        }
    }
}

impl SourceClient for FsSourceClient {
    #[instrument(
        name = "fs_source_fetch",
        skip(self, reference),
        fields(asset_id = %reference.asset_id)
    )]
    async fn fetch_asset(&self, reference: &AttachmentRef) -> Result<Bytes, RelayError> {
        let path = self.root.join(&reference.asset_id);

        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| RelayError::asset_fetch(&reference.asset_id, e.to_string()))?;

        if meta.len() > self.max_asset_bytes {
            return Err(RelayError::AssetTooLarge {
                asset_id: reference.asset_id.clone(),
                size: meta.len(),
                max: self.max_asset_bytes,
            });
        }

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| RelayError::asset_fetch(&reference.asset_id, e.to_string()))?;

        debug!(bytes = data.len(), "asset read from disk");
        Ok(Bytes::from(data))
    }
}
