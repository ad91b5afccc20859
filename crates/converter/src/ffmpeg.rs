//! FfmpegConverter - looping clip to animated GIF via external ffmpeg

use std::path::{Path, PathBuf};
use std::process::Command;

use bytes::Bytes;
use tempfile::{Builder, TempPath};
use tracing::{debug, instrument, warn};

use contracts::{AssetConverter, AttachmentKind, RelayError};

/// GIF resampling: fixed frame rate, bounded horizontal resolution,
/// palette pass for acceptable quality, looping forever.
const GIF_FILTER: &str =
    "fps=10,scale=480:-1:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse";

/// Converter backed by an external `ffmpeg` process.
///
/// The transcode writes the clip to a scratch file, runs ffmpeg on the
/// blocking worker pool and reads the resulting GIF back. Scratch files are
/// removed on success, on conversion failure and on read failure; a cleanup
/// failure is logged, never escalated.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    ffmpeg: PathBuf,
    scratch_dir: PathBuf,
}

impl FfmpegConverter {
    /// Create a converter using `ffmpeg` from PATH.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Create a converter with an explicit ffmpeg binary path.
    pub fn with_binary(ffmpeg: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Transcode one looping clip into an animated GIF.
    ///
    /// Runs on `spawn_blocking` so a slow transcode never stalls event
    /// admission or delivery of unrelated batches.
    #[instrument(name = "converter_clip_to_gif", skip(self, data), fields(input_bytes = data.len()))]
    async fn clip_to_gif(&self, data: Bytes) -> Result<Bytes, RelayError> {
        let ffmpeg = self.ffmpeg.clone();
        let scratch_dir = self.scratch_dir.clone();

        tokio::task::spawn_blocking(move || convert_blocking(&ffmpeg, &scratch_dir, &data))
            .await
            .map_err(|e| RelayError::conversion(format!("conversion task failed: {e}")))?
    }
}

impl AssetConverter for FfmpegConverter {
    async fn convert(&self, data: Bytes, kind: AttachmentKind) -> Result<Bytes, RelayError> {
        match kind {
            AttachmentKind::AnimatedLoop => self.clip_to_gif(data).await,
            // Images and regular videos go out in their source encoding
            AttachmentKind::Image | AttachmentKind::Video => Ok(data),
        }
    }
}

fn convert_blocking(ffmpeg: &Path, scratch_dir: &Path, data: &[u8]) -> Result<Bytes, RelayError> {
    std::fs::create_dir_all(scratch_dir)?;

    let input = scratch_file(scratch_dir, ".mp4")?;
    std::fs::write(&input, data)?;
    debug!(path = %input.display(), "wrote clip to scratch file");

    let output = scratch_file(scratch_dir, ".gif")?;

    let result = run_ffmpeg(ffmpeg, &input, &output).and_then(|()| {
        std::fs::read(&output)
            .map(Bytes::from)
            .map_err(|e| RelayError::conversion(format!("failed to read converted gif: {e}")))
    });

    remove_scratch(input);
    remove_scratch(output);

    result
}

/// Reserve a uniquely named scratch file and detach it from the tempfile
/// guard; cleanup is explicit so its failure can be logged.
fn scratch_file(dir: &Path, suffix: &str) -> Result<TempPath, RelayError> {
    let file = Builder::new()
        .prefix("relay_clip_")
        .suffix(suffix)
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}

fn run_ffmpeg(ffmpeg: &Path, input: &Path, output: &Path) -> Result<(), RelayError> {
    let result = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-vf")
        .arg(GIF_FILTER)
        .arg("-loop")
        .arg("0")
        .arg(output)
        .output()
        .map_err(|e| RelayError::conversion(format!("failed to launch ffmpeg: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(RelayError::conversion(format!(
            "ffmpeg exited with {}: {}",
            result.status,
            stderr.trim()
        )));
    }
    Ok(())
}

fn remove_scratch(path: TempPath) {
    if let Err(e) = path.close() {
        warn!(error = %e, "failed to remove scratch file");
    }
}
