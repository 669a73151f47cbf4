//! Configuration loaded from the environment.

use std::env;
use std::path::PathBuf;

/// Runtime configuration for the pipeline and HTTP server.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Redis connection URL (job queue + record store)
    pub redis_url: String,
    /// Root directory for uploaded sources and derived artifacts
    pub media_root: PathBuf,
    /// Public base URL prefixed onto rewritten playlist entries
    pub public_base_url: String,
    /// Origin allowed to fetch playlists/segments cross-origin
    pub allowed_origin: String,
    /// Bearer credential expected on every read/ingest route
    pub api_token: String,
    /// Number of worker loops pulling jobs from the queue
    pub num_workers: usize,
    /// Upper bound on a single encoder invocation, in seconds
    pub encode_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("3000")),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| String::from("redis://127.0.0.1/")),
            media_root: PathBuf::from(
                env::var("MEDIA_ROOT").unwrap_or_else(|_| String::from("./media")),
            ),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| String::from("https://localhost:3000")),
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| String::from("http://localhost:4200")),
            api_token: env::var("API_TOKEN").unwrap_or_else(|_| String::from("dev-token")),
            num_workers: env::var("NUM_WORKERS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(4),
            encode_timeout_secs: env::var("ENCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(3600),
        }
    }
}
