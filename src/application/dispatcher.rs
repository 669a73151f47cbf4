//! Reaction to "video record created": enqueue the processing jobs.

use std::sync::Arc;

use crate::domain::jobs::Job;
use crate::ports::queue::JobQueue;

/// Enqueues the three independent pipeline jobs for a freshly created
/// record. Each job carries only the video id, so a job always re-reads the
/// current record instead of capturing state that may go stale in the queue.
pub struct JobDispatcher<Q> {
    queue: Arc<Q>,
}

impl<Q: JobQueue> JobDispatcher<Q> {
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    /// Called exactly once per created record, from the creation use case.
    /// Fire-and-forget: the dispatcher neither waits for nor tracks job
    /// completion, and an enqueue failure never propagates into the
    /// creation path.
    pub async fn video_created(&self, video_id: i64) {
        let jobs = [
            Job::transcode(video_id),
            Job::thumbnail(video_id),
            Job::preview(video_id),
        ];
        for job in jobs {
            if let Err(err) = self.queue.enqueue_job(job).await {
                tracing::error!(video_id, kind = ?job.task_kind, error = %err, "failed to enqueue job");
            }
        }
    }
}
