//! # Converter
//!
//! Media re-encoding module.
//!
//! Responsibilities:
//! - Transcode looping video clips into animated GIFs via external ffmpeg
//! - Keep the CPU/IO-heavy work on the blocking worker pool
//! - Guarantee scratch-file cleanup on every exit path

mod ffmpeg;

pub use contracts::{AssetConverter, AttachmentKind};
pub use ffmpeg::FfmpegConverter;
