//! Derived single-shot assets: poster thumbnail and preview clip.
//!
//! Both extractors are idempotent through their output directory: a
//! non-empty directory means a prior delivery already did the work, and the
//! job short-circuits as success instead of re-invoking the encoder.

use std::path::Path;

use super::transcode::scale_pad_filter;

/// Poster frame is always captured 5 seconds in.
pub const THUMBNAIL_OFFSET: &str = "00:00:05";
/// Preview clips are a fixed 20 seconds long.
pub const PREVIEW_DURATION_SECONDS: u32 = 20;

pub const THUMBNAIL_SUFFIX: &str = "thumb.jpg";
pub const PREVIEW_SUFFIX: &str = "preview.mp4";

/// Single still frame, visually near the start but past any fade-in.
pub fn thumbnail_args(source: &Path, target: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-ss".into(),
        THUMBNAIL_OFFSET.into(),
        "-i".into(),
        source.to_string_lossy().into_owned(),
        "-vframes".into(),
        "1".into(),
        "-q:v".into(),
        "2".into(),
        target.to_string_lossy().into_owned(),
    ]
}

/// Preview clips start a quarter of the way in, past intros.
pub fn preview_start_seconds(duration_seconds: f64) -> u64 {
    (duration_seconds * 0.25) as u64
}

/// HD sources get a 1080p preview frame, everything smaller gets 720p.
pub fn preview_frame(source_width: u32) -> (u32, u32) {
    if source_width >= 1280 {
        (1920, 1080)
    } else {
        (1280, 720)
    }
}

pub fn preview_args(
    source: &Path,
    target: &Path,
    start_seconds: u64,
    frame: (u32, u32),
) -> Vec<String> {
    let (width, height) = frame;
    vec![
        "-y".into(),
        "-ss".into(),
        start_seconds.to_string(),
        "-i".into(),
        source.to_string_lossy().into_owned(),
        "-t".into(),
        PREVIEW_DURATION_SECONDS.to_string(),
        "-vf".into(),
        scale_pad_filter(width, height),
        "-c:v".into(),
        "libx264".into(),
        "-c:a".into(),
        "aac".into(),
        target.to_string_lossy().into_owned(),
    ]
}

/// True when the directory exists and already holds at least one entry.
pub async fn dir_has_output(dir: &Path) -> bool {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => entries.next_entry().await.ok().flatten().is_some(),
        Err(_) => false,
    }
}
