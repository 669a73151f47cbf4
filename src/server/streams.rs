//! Playlist and segment serving.
//!
//! Artifacts are resolved strictly from the record's storage folder; an
//! absent record or file is a 404, never a server error. Playlists are
//! rewritten on the way out so every embedded reference is an absolute
//! public URL (clients fetch from a public host, not the storage root).

use axum::extract::{Path as UrlPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use super::AppState;
use crate::domain::hls::rewrite_playlist;
use crate::domain::video::VideoAsset;
use crate::ports::queue::JobQueue;
use crate::ports::videos::{StoreError, VideoStore};

pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
pub const SEGMENT_CONTENT_TYPE: &str = "video/MP2T";

/// `GET /video/{id}/{resolution}/index.m3u8/`
///
/// `resolution` of `master` resolves the master playlist; otherwise the
/// named variant playlist.
pub async fn playlist<Q, V>(
    State(state): State<AppState<Q, V>>,
    UrlPath((id, resolution)): UrlPath<(i64, String)>,
) -> Response
where
    Q: JobQueue + Send + Sync + 'static,
    V: VideoStore + Send + Sync + 'static,
{
    if !component_is_safe(&resolution) {
        return not_found("playlist not found");
    }
    let video = match resolve_video(&state, id).await {
        Ok(video) => video,
        Err(response) => return response,
    };

    let path = state
        .config
        .media_root
        .join(video.hls_dir_rel())
        .join(format!("{resolution}.m3u8"));
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(_) => return not_found("playlist not found"),
    };

    let body = rewrite_playlist(&content, video.id, &state.config.public_base_url);
    ([(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)], body).into_response()
}

/// `GET /video/{id}/{resolution}/{segment}/`; the on-disk segment name is
/// `{resolution}_{segment}`.
pub async fn segment<Q, V>(
    State(state): State<AppState<Q, V>>,
    UrlPath((id, resolution, segment)): UrlPath<(i64, String, String)>,
) -> Response
where
    Q: JobQueue + Send + Sync + 'static,
    V: VideoStore + Send + Sync + 'static,
{
    if !component_is_safe(&resolution) || !component_is_safe(&segment) {
        return not_found("segment not found");
    }
    let video = match resolve_video(&state, id).await {
        Ok(video) => video,
        Err(response) => return response,
    };

    let path = state
        .config
        .media_root
        .join(video.hls_dir_rel())
        .join(format!("{resolution}_{segment}"));
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(_) => return not_found("segment not found"),
    };

    ([(header::CONTENT_TYPE, SEGMENT_CONTENT_TYPE)], bytes).into_response()
}

async fn resolve_video<Q, V>(state: &AppState<Q, V>, id: i64) -> Result<VideoAsset, Response>
where
    Q: JobQueue + Send + Sync + 'static,
    V: VideoStore + Send + Sync + 'static,
{
    match state.videos.fetch(id).await {
        Ok(video) => Ok(video),
        Err(StoreError::NotFound(_)) => Err(not_found("video not found")),
        Err(err) => {
            tracing::error!(video_id = id, error = %err, "record store failure while serving");
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

fn not_found(message: &'static str) -> Response {
    (StatusCode::NOT_FOUND, message).into_response()
}

/// Resolution/segment values come straight from the URL; they must stay a
/// single path component.
fn component_is_safe(value: &str) -> bool {
    !value.is_empty() && !value.contains("..") && !value.contains('/') && !value.contains('\\')
}
