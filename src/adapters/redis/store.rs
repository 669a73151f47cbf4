//! Redis VideoStore implementation.

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use uuid::Uuid;

use super::error::store_backend;
use super::pool::RedisPool;
use super::{video_key, VIDEO_ID_SEQ};
use crate::domain::video::{NewVideo, VideoAsset};
use crate::ports::videos::{StoreError, VideoStore};

impl RedisPool {
    async fn load(&self, id: i64) -> Result<VideoAsset, StoreError> {
        let mut conn = self.pool.get().await.map_err(store_backend)?;
        let json: Option<String> = conn.get(video_key(id)).await.map_err(store_backend)?;
        match json {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn save(&self, video: &VideoAsset) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(store_backend)?;
        let json = serde_json::to_string(video)?;
        conn.set::<_, _, ()>(video_key(video.id), json)
            .await
            .map_err(store_backend)?;
        Ok(())
    }
}

#[async_trait]
impl VideoStore for RedisPool {
    async fn insert(&self, new: NewVideo) -> Result<VideoAsset, StoreError> {
        let mut conn = self.pool.get().await.map_err(store_backend)?;
        let id: i64 = conn.incr(VIDEO_ID_SEQ, 1i64).await.map_err(store_backend)?;
        drop(conn);

        let uuid = Uuid::new_v4();
        let video = VideoAsset {
            id,
            uuid,
            source_path: new.source_path_for(&uuid),
            title: new.title,
            description: new.description,
            master_playlist_path: None,
            duration_seconds: 0,
            thumbnail_path: None,
            preview_path: None,
        };
        self.save(&video).await?;
        Ok(video)
    }

    async fn fetch(&self, id: i64) -> Result<VideoAsset, StoreError> {
        self.load(id).await
    }

    async fn set_stream_ready(
        &self,
        id: i64,
        master_playlist_path: &str,
        duration_seconds: u32,
    ) -> Result<(), StoreError> {
        let mut video = self.load(id).await?;
        video.master_playlist_path = Some(master_playlist_path.to_string());
        video.duration_seconds = duration_seconds;
        self.save(&video).await
    }

    async fn set_thumbnail(&self, id: i64, thumbnail_path: &str) -> Result<(), StoreError> {
        let mut video = self.load(id).await?;
        video.thumbnail_path = Some(thumbnail_path.to_string());
        self.save(&video).await
    }

    async fn set_preview(&self, id: i64, preview_path: &str) -> Result<(), StoreError> {
        let mut video = self.load(id).await?;
        video.preview_path = Some(preview_path.to_string());
        self.save(&video).await
    }
}
