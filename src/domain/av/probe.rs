//! Source metadata extraction.

use std::path::Path;
use std::process::ExitStatus;

use serde::Deserialize;

use super::cmd::MediaProber;

/// Duration and pixel dimensions of a source file. Never mutates anything;
/// both the transcode job (ladder decision) and the preview extractor
/// (start offset, target framing) read from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("prober failed to run: {0}")]
    Io(#[from] std::io::Error),
    #[error("prober exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("unparsable prober output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("source has no video stream")]
    NoVideoStream,
    #[error("prober output carries no duration")]
    MissingDuration,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Run the prober against `path` and pull out duration plus the first video
/// stream's dimensions.
pub async fn probe_media(prober: &dyn MediaProber, path: &Path) -> Result<MediaInfo, ProbeError> {
    let output = prober.run_ffprobe(path).await?;
    if !output.status.success() {
        return Err(ProbeError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(ProbeError::NoVideoStream)?;
    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) => (w, h),
        _ => return Err(ProbeError::NoVideoStream),
    };

    let duration_seconds = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or(ProbeError::MissingDuration)?;

    Ok(MediaInfo {
        duration_seconds,
        width,
        height,
    })
}
