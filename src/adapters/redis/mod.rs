//! Redis adapter.
//!
//! One connection pool backs both ports:
//! - `JobQueue`: jobs as JSON in a list (`LPUSH`/`BRPOP`)
//! - `VideoStore`: records as JSON values, ids from `INCR`

mod error;
mod pool;
mod queue;
mod store;

pub use error::PoolInitError;
pub use pool::RedisPool;

/// Redis key constants
const JOB_QUEUE: &str = "armstrong:jobs";
const VIDEO_PREFIX: &str = "armstrong:video:";
const VIDEO_ID_SEQ: &str = "armstrong:video_id_seq";

fn video_key(id: i64) -> String {
    format!("{VIDEO_PREFIX}{id}")
}
