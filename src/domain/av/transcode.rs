//! Per-tier rendition encoding.

use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use super::cmd::EncoderRunner;
use crate::domain::hls::RenditionResult;
use crate::domain::ladder::{RenditionSpec, KEYFRAME_INTERVAL, SEGMENT_SECONDS};

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("encoder failed to run: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Scale into the target box preserving aspect ratio, then letterbox-pad to
/// exactly the box, centered. Every tier ends up with uniform dimensions
/// regardless of the source aspect ratio.
pub fn scale_pad_filter(width: u32, height: u32) -> String {
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"
    )
}

/// Full encoder argument list for one rendition tier: segmented H.264 video
/// at the tier's bitrate with fixed AAC audio, 4 s segments, VOD playlist.
pub fn tier_args(source: &Path, hls_dir: &Path, tier: &RenditionSpec) -> Vec<String> {
    let bitrate = format!("{}k", tier.bitrate_kbps);
    let variant = hls_dir.join(tier.variant_playlist_filename());
    let segments = hls_dir.join(tier.segment_filename_pattern());

    vec![
        "-y".into(),
        "-i".into(),
        source.to_string_lossy().into_owned(),
        "-vf".into(),
        scale_pad_filter(tier.target_width, tier.target_height),
        "-c:a".into(),
        "aac".into(),
        "-ar".into(),
        "48000".into(),
        "-c:v".into(),
        "h264".into(),
        "-profile:v".into(),
        "main".into(),
        "-crf".into(),
        "20".into(),
        "-sc_threshold".into(),
        "0".into(),
        "-g".into(),
        KEYFRAME_INTERVAL.to_string(),
        "-keyint_min".into(),
        KEYFRAME_INTERVAL.to_string(),
        "-b:v".into(),
        bitrate.clone(),
        "-maxrate".into(),
        bitrate,
        "-bufsize".into(),
        "4200k".into(),
        "-b:a".into(),
        "128k".into(),
        "-hls_time".into(),
        SEGMENT_SECONDS.to_string(),
        "-hls_playlist_type".into(),
        "vod".into(),
        "-hls_segment_filename".into(),
        segments.to_string_lossy().into_owned(),
        variant.to_string_lossy().into_owned(),
    ]
}

/// Run one encoder invocation to completion, mapping a non-zero exit into
/// [`EncodeError::Failed`].
pub async fn run_encode(
    encoder: &dyn EncoderRunner,
    args: &[String],
    timeout: Duration,
) -> Result<(), EncodeError> {
    let output = encoder.run_ffmpeg(args, timeout).await?;
    if !output.status.success() {
        return Err(EncodeError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Encode every selected tier in ladder order. A failing tier is logged and
/// skipped; it must never abort the remaining tiers. Only tiers that
/// actually encoded contribute a [`RenditionResult`].
pub async fn encode_ladder(
    encoder: &dyn EncoderRunner,
    source: &Path,
    hls_dir: &Path,
    tiers: &[RenditionSpec],
    timeout: Duration,
) -> Vec<RenditionResult> {
    let mut results = Vec::with_capacity(tiers.len());
    for tier in tiers {
        let args = tier_args(source, hls_dir, tier);
        match run_encode(encoder, &args, timeout).await {
            Ok(()) => {
                tracing::debug!(tier = tier.label, "rendition tier encoded");
                results.push(RenditionResult::from_spec(tier));
            }
            Err(err) => {
                tracing::warn!(tier = tier.label, error = %err, "rendition tier failed, continuing");
            }
        }
    }
    results
}
