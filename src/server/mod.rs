//! HTTP surface: authenticated ingest plus rendition file serving.

pub mod auth;
pub mod streams;
pub mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, CorsLayer};

use crate::application::dispatcher::JobDispatcher;
use crate::config::AppConfig;
use crate::ports::queue::JobQueue;
use crate::ports::videos::VideoStore;

pub struct AppState<Q, V> {
    pub videos: Arc<V>,
    pub dispatcher: Arc<JobDispatcher<Q>>,
    pub config: Arc<AppConfig>,
}

impl<Q, V> Clone for AppState<Q, V> {
    fn clone(&self) -> Self {
        Self {
            videos: self.videos.clone(),
            dispatcher: self.dispatcher.clone(),
            config: self.config.clone(),
        }
    }
}

/// The player runs on a different origin than the file server, so playlist
/// and segment responses carry fixed permissive-for-one-origin CORS
/// headers; preflight is answered by the layer before authentication runs.
pub fn build_router<Q, V>(state: AppState<Q, V>) -> Router
where
    Q: JobQueue + Send + Sync + 'static,
    V: VideoStore + Send + Sync + 'static,
{
    let origin = state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .expect("ALLOWED_ORIGIN must be a valid header value");
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/video/", post(upload::create_video::<Q, V>))
        .route(
            "/video/:id/:resolution/index.m3u8/",
            get(streams::playlist::<Q, V>),
        )
        .route(
            "/video/:id/:resolution/:segment/",
            get(streams::segment::<Q, V>),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth::require_token,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hls::render_master;
    use crate::domain::hls::RenditionResult;
    use crate::domain::ladder::RENDITION_LADDER;
    use crate::domain::video::VideoAsset;
    use crate::ports::queue::MockJobQueue;
    use crate::ports::videos::{MockVideoStore, StoreError};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use uuid::Uuid;

    const TOKEN: &str = "sekrit";

    fn test_config(media_root: &Path) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            addr: String::from("127.0.0.1"),
            port: String::from("0"),
            redis_url: String::from("redis://127.0.0.1/"),
            media_root: media_root.to_path_buf(),
            public_base_url: String::from("https://cdn.example.com"),
            allowed_origin: String::from("http://localhost:4200"),
            api_token: String::from(TOKEN),
            num_workers: 1,
            encode_timeout_secs: 60,
        })
    }

    fn test_video(id: i64) -> VideoAsset {
        VideoAsset {
            id,
            uuid: Uuid::nil(),
            title: String::from("Clip"),
            description: None,
            source_path: format!("videos/Clip_{}/clip.mp4", Uuid::nil()),
            master_playlist_path: None,
            duration_seconds: 0,
            thumbnail_path: None,
            preview_path: None,
        }
    }

    fn router_with(
        store: MockVideoStore,
        queue: MockJobQueue,
        config: Arc<AppConfig>,
    ) -> Router {
        build_router(AppState {
            videos: Arc::new(store),
            dispatcher: Arc::new(JobDispatcher::new(Arc::new(queue))),
            config,
        })
    }

    fn authed_get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn missing_credential_is_unauthorized() {
        let dir = TempDir::new().unwrap();
        let app = router_with(
            MockVideoStore::new(),
            MockJobQueue::new(),
            test_config(dir.path()),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/video/1/720p/index.m3u8/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_video_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = MockVideoStore::new();
        store
            .expect_fetch()
            .returning(|id| Err(StoreError::NotFound(id)));

        let app = router_with(store, MockJobQueue::new(), test_config(dir.path()));
        let response = app
            .oneshot(authed_get("/video/1/1080p/index.m3u8/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn absent_playlist_file_is_not_found_not_an_error() {
        let dir = TempDir::new().unwrap();
        let mut store = MockVideoStore::new();
        store.expect_fetch().returning(|_| Ok(test_video(1)));

        let app = router_with(store, MockJobQueue::new(), test_config(dir.path()));
        let response = app
            .oneshot(authed_get("/video/1/1080p/index.m3u8/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn variant_playlist_is_rewritten_to_public_urls() {
        let dir = TempDir::new().unwrap();
        let video = test_video(1);
        let hls_dir = dir.path().join(video.hls_dir_rel());
        tokio::fs::create_dir_all(&hls_dir).await.unwrap();
        tokio::fs::write(
            hls_dir.join("720p.m3u8"),
            "#EXTM3U\n#EXTINF:4.0,\n720p_000.ts\n#EXT-X-ENDLIST\n",
        )
        .await
        .unwrap();

        let mut store = MockVideoStore::new();
        store.expect_fetch().returning(|_| Ok(test_video(1)));

        let app = router_with(store, MockJobQueue::new(), test_config(dir.path()));
        let response = app
            .oneshot(authed_get("/video/1/720p/index.m3u8/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            streams::PLAYLIST_CONTENT_TYPE
        );

        let body = body_string(response).await;
        assert!(body.contains("https://cdn.example.com/video/1/720p/000.ts/"));
        assert!(!body.contains("\n720p_000.ts"));
    }

    #[tokio::test]
    async fn master_playlist_is_served_under_the_master_resolution() {
        let dir = TempDir::new().unwrap();
        let video = test_video(1);
        let hls_dir = dir.path().join(video.hls_dir_rel());
        tokio::fs::create_dir_all(&hls_dir).await.unwrap();
        let results: Vec<_> = RENDITION_LADDER.iter().map(RenditionResult::from_spec).collect();
        tokio::fs::write(hls_dir.join("master.m3u8"), render_master(&results))
            .await
            .unwrap();

        let mut store = MockVideoStore::new();
        store.expect_fetch().returning(|_| Ok(test_video(1)));

        let app = router_with(store, MockJobQueue::new(), test_config(dir.path()));
        let response = app
            .oneshot(authed_get("/video/1/master/index.m3u8/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("https://cdn.example.com/video/1/360p/index.m3u8/"));
        assert!(body.contains("https://cdn.example.com/video/1/1080p/index.m3u8/"));
    }

    #[tokio::test]
    async fn segment_bytes_are_served_with_transport_content_type() {
        let dir = TempDir::new().unwrap();
        let video = test_video(1);
        let hls_dir = dir.path().join(video.hls_dir_rel());
        tokio::fs::create_dir_all(&hls_dir).await.unwrap();
        tokio::fs::write(hls_dir.join("720p_000.ts"), b"mpegts bytes")
            .await
            .unwrap();

        let mut store = MockVideoStore::new();
        store.expect_fetch().returning(|_| Ok(test_video(1)));

        let app = router_with(store, MockJobQueue::new(), test_config(dir.path()));
        let response = app.oneshot(authed_get("/video/1/720p/000.ts/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            streams::SEGMENT_CONTENT_TYPE
        );
        assert_eq!(body_string(response).await, "mpegts bytes");
    }

    #[tokio::test]
    async fn missing_segment_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = MockVideoStore::new();
        store.expect_fetch().returning(|_| Ok(test_video(1)));

        let app = router_with(store, MockJobQueue::new(), test_config(dir.path()));
        let response = app.oneshot(authed_get("/video/1/720p/999.ts/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn traversal_resolution_never_reaches_the_store() {
        let dir = TempDir::new().unwrap();
        // No fetch expectation: touching the store panics the test.
        let app = router_with(
            MockVideoStore::new(),
            MockJobQueue::new(),
            test_config(dir.path()),
        );
        let response = app
            .oneshot(authed_get("/video/1/%2e%2e/index.m3u8/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn preflight_answers_with_cors_headers_and_no_auth() {
        let dir = TempDir::new().unwrap();
        let app = router_with(
            MockVideoStore::new(),
            MockJobQueue::new(),
            test_config(dir.path()),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/video/1/720p/index.m3u8/")
                    .header(header::ORIGIN, "http://localhost:4200")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:4200"
        );
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn upload_creates_record_streams_file_and_dispatches_jobs() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());

        let mut store = MockVideoStore::new();
        store.expect_insert().times(1).returning(|new| {
            let uuid = Uuid::nil();
            Ok(VideoAsset {
                id: 1,
                uuid,
                source_path: new.source_path_for(&uuid),
                title: new.title,
                description: new.description,
                master_playlist_path: None,
                duration_seconds: 0,
                thumbnail_path: None,
                preview_path: None,
            })
        });

        let mut queue = MockJobQueue::new();
        queue.expect_enqueue_job().times(3).returning(|_| Ok(()));

        let app = router_with(store, queue, config.clone());

        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Sintel\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"sintel.mp4\"\r\n\
             Content-Type: video/mp4\r\n\r\n\
             FAKEVIDEO\r\n\
             --{boundary}--\r\n"
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/video/")
                    .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let saved = config
            .media_root
            .join(format!("videos/Sintel_{}/sintel.mp4", Uuid::nil()));
        assert_eq!(tokio::fs::read_to_string(saved).await.unwrap(), "FAKEVIDEO");
    }
}
