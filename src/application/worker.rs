//! Job consumption: each worker loop pulls one job at a time and runs it to
//! completion. Every failure is contained inside the job; the loop never
//! dies.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::domain::av::cmd::{EncoderRunner, MediaProber, RealEncoderRunner, RealMediaProber};
use crate::domain::av::extract;
use crate::domain::av::probe::{probe_media, ProbeError};
use crate::domain::av::transcode::{encode_ladder, run_encode, EncodeError};
use crate::domain::hls::{render_master, MASTER_PLAYLIST_FILENAME};
use crate::domain::jobs::{Job, TaskKind};
use crate::domain::ladder::select_tiers;
use crate::domain::video::{is_still_image, VideoAsset};
use crate::ports::queue::JobQueue;
use crate::ports::videos::{StoreError, VideoStore};

/// How long a worker blocks on the queue before looping again.
const DEQUEUE_TIMEOUT_SECS: f64 = 5.0;

/// The two process seams, bundled for injection into the worker.
pub struct MediaTools {
    pub prober: Arc<dyn MediaProber>,
    pub encoder: Arc<dyn EncoderRunner>,
}

impl MediaTools {
    /// ffprobe/ffmpeg from `PATH`.
    pub fn real() -> Self {
        Self {
            prober: Arc::new(RealMediaProber),
            encoder: Arc::new(RealEncoderRunner),
        }
    }
}

/// How a job ended. Only `Completed` patched the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    /// Output from an earlier delivery already exists; success without work.
    AlreadyPresent,
    /// Valid terminal no-op: still-image source, source below the lowest
    /// tier, or every tier failed.
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("source file missing for video {0}")]
    SourceMissing(i64),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("writing derived artifacts failed: {0}")]
    Io(#[from] std::io::Error),
}

pub struct WorkerService<Q, V> {
    queue: Arc<Q>,
    videos: Arc<V>,
    media: MediaTools,
    config: Arc<AppConfig>,
}

impl<Q, V> WorkerService<Q, V>
where
    Q: JobQueue + 'static,
    V: VideoStore + 'static,
{
    pub fn new(queue: Arc<Q>, videos: Arc<V>, media: MediaTools, config: Arc<AppConfig>) -> Self {
        Self {
            queue,
            videos,
            media,
            config,
        }
    }

    pub async fn run_worker_loop(&self, worker_id: usize) {
        tracing::info!(worker_id, "worker started");
        loop {
            match self.queue.dequeue_job(DEQUEUE_TIMEOUT_SECS).await {
                Ok(Some(job)) => self.run_job(&job, worker_id).await,
                Ok(None) => continue,
                Err(err) => {
                    tracing::error!(worker_id, error = %err, "queue error");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn run_job(&self, job: &Job, worker_id: usize) {
        let kind = job.task_kind;
        let video_id = job.video_id;
        match self.process_job(job).await {
            Ok(JobOutcome::Completed) => {
                tracing::info!(worker_id, ?kind, video_id, "job completed");
            }
            Ok(JobOutcome::AlreadyPresent) => {
                tracing::debug!(worker_id, ?kind, video_id, "output already present");
            }
            Ok(JobOutcome::Skipped) => {
                tracing::info!(worker_id, ?kind, video_id, "job skipped");
            }
            Err(JobError::Store(StoreError::NotFound(id))) => {
                tracing::warn!(worker_id, ?kind, video_id = id, "record not found, dropping job");
            }
            Err(err) => {
                tracing::error!(worker_id, ?kind, video_id, error = %err, "job failed");
            }
        }
    }

    pub async fn process_job(&self, job: &Job) -> Result<JobOutcome, JobError> {
        match job.task_kind {
            TaskKind::Transcode => self.process_transcode(job.video_id).await,
            TaskKind::Thumbnail => self.process_thumbnail(job.video_id).await,
            TaskKind::Preview => self.process_preview(job.video_id).await,
        }
    }

    fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.config.encode_timeout_secs)
    }

    async fn source_checked(&self, video: &VideoAsset) -> Result<PathBuf, JobError> {
        let source = video.source_abs(&self.config.media_root);
        if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
            return Err(JobError::SourceMissing(video.id));
        }
        Ok(source)
    }

    async fn process_transcode(&self, video_id: i64) -> Result<JobOutcome, JobError> {
        let video = self.videos.fetch(video_id).await?;

        // Re-delivery guard: the playlist is set exactly once per record,
        // so a second delivery re-encodes nothing.
        if video.master_playlist_path.is_some() {
            return Ok(JobOutcome::AlreadyPresent);
        }

        let source = self.source_checked(&video).await?;
        if is_still_image(&source) {
            tracing::warn!(video_id, "source is a still image, skipping transcode");
            return Ok(JobOutcome::Skipped);
        }

        let info = probe_media(self.media.prober.as_ref(), &source).await?;
        let tiers = select_tiers(info.width, info.height);
        if tiers.is_empty() {
            tracing::info!(
                video_id,
                width = info.width,
                height = info.height,
                "source below lowest tier, no renditions produced"
            );
            return Ok(JobOutcome::Skipped);
        }

        let hls_dir = self.config.media_root.join(video.hls_dir_rel());
        tokio::fs::create_dir_all(&hls_dir).await?;

        let results = encode_ladder(
            self.media.encoder.as_ref(),
            &source,
            &hls_dir,
            &tiers,
            self.encode_timeout(),
        )
        .await;
        if results.is_empty() {
            tracing::warn!(video_id, "no tier encoded, record left untouched");
            return Ok(JobOutcome::Skipped);
        }

        tokio::fs::write(hls_dir.join(MASTER_PLAYLIST_FILENAME), render_master(&results)).await?;

        let master_rel = video.hls_dir_rel().join(MASTER_PLAYLIST_FILENAME);
        self.videos
            .set_stream_ready(
                video_id,
                &master_rel.to_string_lossy(),
                info.duration_seconds as u32,
            )
            .await?;
        Ok(JobOutcome::Completed)
    }

    async fn process_thumbnail(&self, video_id: i64) -> Result<JobOutcome, JobError> {
        let video = self.videos.fetch(video_id).await?;
        let source = self.source_checked(&video).await?;

        let thumb_dir = self.config.media_root.join(video.thumbnails_dir_rel());
        if extract::dir_has_output(&thumb_dir).await {
            return Ok(JobOutcome::AlreadyPresent);
        }
        tokio::fs::create_dir_all(&thumb_dir).await?;

        let filename = format!("{}_{}", video.source_stem(), extract::THUMBNAIL_SUFFIX);
        let target = thumb_dir.join(&filename);
        run_encode(
            self.media.encoder.as_ref(),
            &extract::thumbnail_args(&source, &target),
            self.encode_timeout(),
        )
        .await?;

        let rel = video.thumbnails_dir_rel().join(&filename);
        self.videos
            .set_thumbnail(video_id, &rel.to_string_lossy())
            .await?;
        Ok(JobOutcome::Completed)
    }

    async fn process_preview(&self, video_id: i64) -> Result<JobOutcome, JobError> {
        let video = self.videos.fetch(video_id).await?;
        let source = self.source_checked(&video).await?;

        let preview_dir = self.config.media_root.join(video.preview_dir_rel());
        if extract::dir_has_output(&preview_dir).await {
            return Ok(JobOutcome::AlreadyPresent);
        }

        // Needs duration for the start offset and width for the framing;
        // probe failure aborts before anything is written.
        let info = probe_media(self.media.prober.as_ref(), &source).await?;
        tokio::fs::create_dir_all(&preview_dir).await?;

        let filename = format!("{}_{}", video.source_stem(), extract::PREVIEW_SUFFIX);
        let target = preview_dir.join(&filename);
        let args = extract::preview_args(
            &source,
            &target,
            extract::preview_start_seconds(info.duration_seconds),
            extract::preview_frame(info.width),
        );
        run_encode(self.media.encoder.as_ref(), &args, self.encode_timeout()).await?;

        let rel = video.preview_dir_rel().join(&filename);
        self.videos
            .set_preview(video_id, &rel.to_string_lossy())
            .await?;
        Ok(JobOutcome::Completed)
    }
}
