//! Redis JobQueue implementation.

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;

use super::error::queue_backend;
use super::pool::RedisPool;
use super::JOB_QUEUE;
use crate::domain::jobs::Job;
use crate::ports::queue::{JobQueue, QueueError};

#[async_trait]
impl JobQueue for RedisPool {
    async fn enqueue_job(&self, job: Job) -> Result<(), QueueError> {
        let mut conn = self.pool.get().await.map_err(queue_backend)?;
        let json = serde_json::to_string(&job)?;
        conn.lpush::<_, _, ()>(JOB_QUEUE, json)
            .await
            .map_err(queue_backend)?;
        Ok(())
    }

    async fn dequeue_job(&self, timeout_secs: f64) -> Result<Option<Job>, QueueError> {
        let mut conn = self.pool.get().await.map_err(queue_backend)?;
        let result: Option<(String, String)> = conn
            .brpop(JOB_QUEUE, timeout_secs)
            .await
            .map_err(queue_backend)?;
        match result {
            Some((_, json)) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
