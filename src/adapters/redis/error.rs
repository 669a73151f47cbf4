//! Error mapping from the Redis client into port errors.

use std::fmt::Display;

use crate::ports::queue::QueueError;
use crate::ports::videos::StoreError;

#[derive(Debug, thiserror::Error)]
#[error("failed to create redis pool: {0}")]
pub struct PoolInitError(String);

impl From<deadpool_redis::CreatePoolError> for PoolInitError {
    fn from(err: deadpool_redis::CreatePoolError) -> Self {
        Self(err.to_string())
    }
}

pub(super) fn queue_backend(err: impl Display) -> QueueError {
    QueueError::Backend(err.to_string())
}

pub(super) fn store_backend(err: impl Display) -> StoreError {
    StoreError::Backend(err.to_string())
}
