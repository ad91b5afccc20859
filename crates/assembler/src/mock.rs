//! Mock collaborators for tests and offline pipelines

use std::collections::{HashMap, HashSet};

use bytes::Bytes;

use contracts::{AssetConverter, AttachmentKind, AttachmentRef, RelayError, SourceClient};

/// In-memory source client with per-asset failure injection.
#[derive(Debug, Clone, Default)]
pub struct MockSourceClient {
    assets: HashMap<String, Bytes>,
    failures: HashSet<String>,
}

impl MockSourceClient {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset served by this mock.
    pub fn with_asset(mut self, asset_id: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.assets.insert(asset_id.into(), data.into());
        self
    }

    /// Make a given asset id fail with a fetch error.
    pub fn with_failure(mut self, asset_id: impl Into<String>) -> Self {
        self.failures.insert(asset_id.into());
        self
    }
}

impl SourceClient for MockSourceClient {
    async fn fetch_asset(&self, reference: &AttachmentRef) -> Result<Bytes, RelayError> {
        if self.failures.contains(&reference.asset_id) {
            return Err(RelayError::asset_fetch(
                &reference.asset_id,
                "injected fetch failure",
            ));
        }
        self.assets
            .get(&reference.asset_id)
            .cloned()
            .ok_or_else(|| RelayError::asset_fetch(&reference.asset_id, "unknown asset"))
    }
}

/// Converter stub: passes bytes through or fails every conversion.
#[derive(Debug, Clone, Copy)]
pub struct MockConverter {
    fail: bool,
}

impl MockConverter {
    /// Converter that returns its input unchanged.
    pub fn passthrough() -> Self {
        Self { fail: false }
    }

    /// Converter that fails every conversion attempt.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl AssetConverter for MockConverter {
    async fn convert(&self, data: Bytes, kind: AttachmentKind) -> Result<Bytes, RelayError> {
        if !kind.needs_conversion() {
            return Ok(data);
        }
        if self.fail {
            return Err(RelayError::conversion("injected conversion failure"));
        }
        Ok(data)
    }
}
