//! Armstrong - Adaptive-Bitrate Video Pipeline
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (rendition ladder, HLS playlists, av jobs)
//! - ports/: Trait definitions (job queue, video record store)
//! - adapters/: Concrete implementations (Redis)
//! - application/: Job dispatcher and worker services
//! - server/: HTTP surface (ingest + rendition file serving)
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;

// Re-exports for convenience
pub use config::AppConfig;
pub use domain::ladder::{select_tiers, RenditionSpec, RENDITION_LADDER};
pub use domain::video::VideoAsset;
