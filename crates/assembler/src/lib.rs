//! # Assembler
//!
//! Payload building and batch assembly module.
//!
//! Responsibilities:
//! - Resolve attachment references through the `SourceClient`
//! - Convert unsupported encodings through the `AssetConverter`
//! - Fold flushed events into one outbound `Batch`
//! - Annotate reposts with an origin prefix
//!
//! ## Usage Example
//!
//! ```ignore
//! use assembler::{Assembler, PayloadBuilder};
//!
//! let builder = PayloadBuilder::new(source_client, converter);
//! let assembler = Assembler::new(builder, "Forwarded from ");
//!
//! let batch = assembler.assemble(&flushed.events).await;
//! dispatcher.deliver(&batch).await?;
//! ```

mod assemble;
mod builder;
mod fs_source;
mod mock;
mod origin;

pub use assemble::Assembler;
pub use builder::{Fragment, PayloadBuilder};
pub use contracts::{Batch, InboundEvent, Payload};
pub use fs_source::FsSourceClient;
pub use mock::{MockConverter, MockSourceClient};
pub use origin::origin_prefix;
