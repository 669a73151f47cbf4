//! Composition root: config, Redis adapters, worker pool, HTTP server.
//!
//! Every service is constructed here and passed down explicitly; there is
//! no global mutable state.

use std::sync::Arc;

use armstrong::adapters::redis::RedisPool;
use armstrong::application::dispatcher::JobDispatcher;
use armstrong::application::worker::{MediaTools, WorkerService};
use armstrong::config::AppConfig;
use armstrong::server::{build_router, AppState};

#[tokio::main]
async fn main() {
    let config = Arc::new(AppConfig::from_env());

    tracing_subscriber::fmt::init();

    // 1. Adapters
    let redis = match RedisPool::new(&config.redis_url) {
        Ok(pool) => Arc::new(pool),
        Err(err) => {
            eprintln!("Failed to connect to Redis: {err}");
            std::process::exit(1);
        }
    };

    // 2. Workers pulling from the job queue
    let worker = Arc::new(WorkerService::new(
        redis.clone(),
        redis.clone(),
        MediaTools::real(),
        config.clone(),
    ));
    for worker_id in 0..config.num_workers {
        let w = worker.clone();
        tokio::spawn(async move {
            w.run_worker_loop(worker_id).await;
        });
    }
    tracing::info!(count = config.num_workers, "started pipeline workers");

    // 3. HTTP layer
    let dispatcher = Arc::new(JobDispatcher::new(redis.clone()));
    let state = AppState {
        videos: redis.clone(),
        dispatcher,
        config: config.clone(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
