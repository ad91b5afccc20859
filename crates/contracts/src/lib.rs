//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Identity Model
//! - `EventId` (i64) is the stable identifier of one delivered post
//! - `GroupKey` ties together the parts of one multi-part submission

mod batch;
mod blueprint;
mod convert;
mod error;
mod event;
mod group_key;
mod sink;
mod source;

pub use batch::*;
pub use blueprint::*;
pub use convert::{AssetConverter, LocalAssetConverter};
pub use error::*;
pub use event::*;
pub use group_key::GroupKey;
pub use sink::{LocalSinkClient, SinkClient};
pub use source::{LocalSourceClient, SourceClient};
