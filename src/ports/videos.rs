use async_trait::async_trait;

use crate::domain::video::{NewVideo, VideoAsset};

/// "Record is gone" and "the store is unhealthy" abort a job the same way,
/// but they are different operational signals and are logged distinctly.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("video {0} not found")]
    NotFound(i64),
    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("record store backend error: {0}")]
    Backend(String),
}

/// Video record store collaborator.
///
/// Updates are field-scoped on purpose: each job patches only the fields it
/// owns, so concurrently running jobs for the same video never overwrite
/// each other's results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Create a record; the store assigns `id` and `uuid` and derives the
    /// storage folder.
    async fn insert(&self, new: NewVideo) -> Result<VideoAsset, StoreError>;

    async fn fetch(&self, id: i64) -> Result<VideoAsset, StoreError>;

    /// Transcode outcome: master playlist location plus probed duration.
    async fn set_stream_ready(
        &self,
        id: i64,
        master_playlist_path: &str,
        duration_seconds: u32,
    ) -> Result<(), StoreError>;

    async fn set_thumbnail(&self, id: i64, thumbnail_path: &str) -> Result<(), StoreError>;

    async fn set_preview(&self, id: i64, preview_path: &str) -> Result<(), StoreError>;
}
