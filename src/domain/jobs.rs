//! Background job payloads.
//!
//! A job carries only the video id. The worker re-reads the record when the
//! job runs, so a delayed or re-delivered job never acts on stale data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Transcode,
    Thumbnail,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub task_kind: TaskKind,
    pub video_id: i64,
}

impl Job {
    pub fn transcode(video_id: i64) -> Self {
        Self {
            task_kind: TaskKind::Transcode,
            video_id,
        }
    }

    pub fn thumbnail(video_id: i64) -> Self {
        Self {
            task_kind: TaskKind::Thumbnail,
            video_id,
        }
    }

    pub fn preview(video_id: i64) -> Self {
        Self {
            task_kind: TaskKind::Preview,
            video_id,
        }
    }
}
