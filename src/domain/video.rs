//! The video record and its storage layout.
//!
//! Every artifact of a video lives under one folder derived from the title
//! and the immutable uuid assigned at creation:
//!
//! ```text
//! videos/{title}_{uuid}/{originalFilename}
//! videos/{title}_{uuid}/hls/{tier}.m3u8
//! videos/{title}_{uuid}/hls/{tier}_000.ts
//! videos/{title}_{uuid}/hls/master.m3u8
//! videos/{title}_{uuid}/thumbnails/{name}_thumb.jpg
//! videos/{title}_{uuid}/preview/{name}_preview.mp4
//! ```
//!
//! Paths stored on the record are relative to the configured media root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const VIDEOS_DIR: &str = "videos";
pub const HLS_SUBDIR: &str = "hls";
pub const THUMBNAILS_SUBDIR: &str = "thumbnails";
pub const PREVIEW_SUBDIR: &str = "preview";

/// File extensions that mark an upload as a still image rather than a
/// video container. Transcoding such a file is always a no-op.
const STILL_IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"];

/// A video record as held by the record store.
///
/// The pipeline never deletes records and only patches the fields it owns:
/// the transcode job sets `master_playlist_path` + `duration_seconds`, the
/// thumbnail job sets `thumbnail_path`, the preview job sets `preview_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub id: i64,
    pub uuid: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Original upload, relative to the media root. Immutable.
    pub source_path: String,
    /// Set exactly once, when at least one rendition tier succeeded.
    pub master_playlist_path: Option<String>,
    /// 0 until probing succeeds.
    pub duration_seconds: u32,
    pub thumbnail_path: Option<String>,
    pub preview_path: Option<String>,
}

/// Creation payload; the store assigns `id` and `uuid` and derives
/// `source_path` from the storage folder.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
}

impl VideoAsset {
    /// Folder name `{title}_{uuid}`; deterministic and never changed after
    /// creation, so every derived path can be computed from the record.
    pub fn storage_folder(&self) -> String {
        format!("{}_{}", self.title, self.uuid)
    }

    /// `videos/{title}_{uuid}`, relative to the media root.
    pub fn folder_rel(&self) -> PathBuf {
        Path::new(VIDEOS_DIR).join(self.storage_folder())
    }

    pub fn hls_dir_rel(&self) -> PathBuf {
        self.folder_rel().join(HLS_SUBDIR)
    }

    pub fn thumbnails_dir_rel(&self) -> PathBuf {
        self.folder_rel().join(THUMBNAILS_SUBDIR)
    }

    pub fn preview_dir_rel(&self) -> PathBuf {
        self.folder_rel().join(PREVIEW_SUBDIR)
    }

    /// Absolute location of the original upload.
    pub fn source_abs(&self, media_root: &Path) -> PathBuf {
        media_root.join(&self.source_path)
    }

    /// Stem of the original filename, used to name derived assets.
    pub fn source_stem(&self) -> String {
        Path::new(&self.source_path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("video"))
    }
}

impl NewVideo {
    /// `videos/{title}_{uuid}/{originalFilename}` for a freshly assigned uuid.
    pub fn source_path_for(&self, uuid: &Uuid) -> String {
        format!(
            "{}/{}_{}/{}",
            VIDEOS_DIR, self.title, uuid, self.original_filename
        )
    }
}

/// Guard against malformed uploads: a still-image container is never fed to
/// the segmenting encoder.
pub fn is_still_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            STILL_IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}
