use async_trait::async_trait;

use crate::domain::jobs::Job;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("job serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("queue backend error: {0}")]
    Backend(String),
}

/// Job queue collaborator. Delivery is at-least-once; consumers tolerate
/// re-delivery through their own idempotency checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job
    async fn enqueue_job(&self, job: Job) -> Result<(), QueueError>;

    /// Dequeue a job (blocking with timeout or non-blocking)
    /// timeout_secs: 0.0 for infinite (or long poll), >0.0 for specific timeout
    async fn dequeue_job(&self, timeout_secs: f64) -> Result<Option<Job>, QueueError>;
}
