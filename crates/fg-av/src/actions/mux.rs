//! Combine a video and an audio fragment into one MP4 using ffmpeg.

use std::path::Path;
use std::time::Duration;

use crate::command::{ToolCommand, ToolOutput};
use crate::tools::ToolRegistry;

/// Mux `video` and `audio` into `output`.
///
/// The video stream is copied as-is, the audio stream is re-encoded to AAC,
/// and the moov atom is moved to the front (`+faststart`). An existing
/// `output` is overwritten.
///
/// # Errors
///
/// Returns [`fg_core::Error::Tool`] if ffmpeg is missing, times out, or exits
/// non-zero. In the last case the message carries the command line and the
/// full captured output.
pub async fn mux(
    tools: &ToolRegistry,
    video: &Path,
    audio: &Path,
    output: &Path,
    timeout: Option<Duration>,
) -> fg_core::Result<ToolOutput> {
    let ffmpeg = tools.require("ffmpeg")?;

    tracing::info!("mux {:?} + {:?} -> {:?}", video, audio, output);

    let mut cmd = ToolCommand::new(ffmpeg.to_path_buf());
    cmd.arg("-y");
    cmd.arg("-i");
    cmd.arg(video);
    cmd.arg("-i");
    cmd.arg(audio);
    cmd.args(["-c:v", "copy", "-c:a", "aac"]);
    cmd.args(["-movflags", "+faststart"]);
    cmd.arg(output);
    cmd.timeout(timeout);

    cmd.execute().await
}
