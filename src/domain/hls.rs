//! Master playlist synthesis and payload rewriting.
//!
//! The master playlist is a pure serialization of the tiers that actually
//! encoded. Variant playlists are written by the encoder itself; this module
//! only ever rewrites their embedded paths when they are served.

use regex::Regex;

use super::ladder::RenditionSpec;

pub const MASTER_PLAYLIST_FILENAME: &str = "master.m3u8";

/// Outcome of one successfully encoded tier. Failed or skipped tiers
/// contribute nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenditionResult {
    pub label: String,
    pub bandwidth_bps: u64,
    pub resolution: String,
    pub variant_playlist_filename: String,
}

impl RenditionResult {
    pub fn from_spec(spec: &RenditionSpec) -> Self {
        Self {
            label: spec.label.to_string(),
            bandwidth_bps: spec.bandwidth_bps(),
            resolution: spec.resolution(),
            variant_playlist_filename: spec.variant_playlist_filename(),
        }
    }
}

/// Serialize the master playlist. Input order is preserved, so feeding the
/// ladder-ordered results yields ascending-bandwidth variants.
///
/// An empty result list has no playlist representation; callers must not
/// write a file or touch the record in that case.
pub fn render_master(results: &[RenditionResult]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for result in results {
        out.push_str(&format!(
            "#EXT-X-STREAM-INF:BANDWIDTH={},RESOLUTION={}\n",
            result.bandwidth_bps, result.resolution
        ));
        out.push_str(&result.variant_playlist_filename);
        out.push('\n');
    }
    out
}

/// Parse a master playlist back into `(bandwidth, resolution, filename)`
/// tuples, in file order. Lines that are not a stream-info/URI pair are
/// ignored.
pub fn parse_master(text: &str) -> Vec<(u64, String, String)> {
    let stream_inf = Regex::new(r"^#EXT-X-STREAM-INF:BANDWIDTH=(\d+),RESOLUTION=(\d+x\d+)$")
        .expect("stream-inf pattern is valid");

    let mut entries = Vec::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        if let Some(caps) = stream_inf.captures(line.trim()) {
            let bandwidth: u64 = caps[1].parse().unwrap_or(0);
            let resolution = caps[2].to_string();
            if let Some(uri) = lines.next() {
                entries.push((bandwidth, resolution, uri.trim().to_string()));
            }
        }
    }
    entries
}

/// Rewrite a playlist payload for serving.
///
/// Playlists written by the encoder reference sibling files by relative
/// path, but clients fetch through a public host that is not the storage
/// root. Every relative URI line becomes an absolute public URL:
///
/// - `{tier}.m3u8`      -> `{base}/video/{id}/{tier}/index.m3u8/`
/// - `{tier}_{seg}`     -> `{base}/video/{id}/{tier}/{seg}/`
///
/// Absolute `http://` URIs are normalized to `https://`; comments and
/// already-secure URIs pass through untouched.
pub fn rewrite_playlist(content: &str, video_id: i64, public_base: &str) -> String {
    let base = public_base.trim_end_matches('/');
    let mut out = String::with_capacity(content.len());

    for line in content.lines() {
        let trimmed = line.trim();
        let rewritten = if trimmed.is_empty() || trimmed.starts_with('#') {
            line.to_string()
        } else if let Some(rest) = trimmed.strip_prefix("http://") {
            format!("https://{rest}")
        } else if trimmed.starts_with("https://") {
            trimmed.to_string()
        } else if let Some(stem) = trimmed.strip_suffix(".m3u8") {
            format!("{base}/video/{video_id}/{stem}/index.m3u8/")
        } else if let Some((tier, segment)) = trimmed.split_once('_') {
            format!("{base}/video/{video_id}/{tier}/{segment}/")
        } else {
            // Unrecognized relative reference; leave it alone rather than
            // produce a URL the server cannot resolve.
            line.to_string()
        };
        out.push_str(&rewritten);
        out.push('\n');
    }
    out
}
