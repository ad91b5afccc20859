//! Layered error definitions
//!
//! Categorized by source: config / asset / conversion / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum RelayError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Asset Errors =====
    /// Asset exceeds the source-side size limit
    #[error("asset '{asset_id}' is too large: {size} bytes, limit is {max} bytes")]
    AssetTooLarge {
        asset_id: String,
        size: u64,
        max: u64,
    },

    /// Transport/client failure fetching one asset
    #[error("failed to fetch asset '{asset_id}': {message}")]
    AssetFetch { asset_id: String, message: String },

    // ===== Conversion Errors =====
    /// Transcode failure
    #[error("conversion failed: {message}")]
    Conversion { message: String },

    // ===== Sink Errors =====
    /// One sink rejected or failed to accept a batch
    #[error("sink '{sink_name}' delivery error: {message}")]
    SinkDelivery { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl RelayError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create asset fetch error
    pub fn asset_fetch(asset_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssetFetch {
            asset_id: asset_id.into(),
            message: message.into(),
        }
    }

    /// Create conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create sink delivery error
    pub fn sink_delivery(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkDelivery {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
