//! Ingest endpoint: accepts a multipart upload, streams it into the
//! storage layout, creates the record and dispatches the pipeline jobs.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{BoxError, Json};
use futures::{Stream, TryStreamExt};
use std::io;
use std::path::{Component, Path};
use tokio::{fs::File, io::BufWriter};
use tokio_util::io::StreamReader;

use super::AppState;
use crate::domain::video::{NewVideo, VideoAsset};
use crate::ports::queue::JobQueue;
use crate::ports::videos::VideoStore;

/// `POST /video/`: multipart with optional `title`/`description` text
/// fields (sent before the file part) and one file part. Responds 201 with
/// the created record.
pub async fn create_video<Q, V>(
    State(state): State<AppState<Q, V>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<VideoAsset>), (StatusCode, String)>
where
    Q: JobQueue + Send + Sync + 'static,
    V: VideoStore + Send + Sync + 'static,
{
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("title") => {
                title = Some(field.text().await.map_err(bad_request)?);
            }
            Some("description") => {
                description = Some(field.text().await.map_err(bad_request)?);
            }
            _ => {
                let Some(file_name) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                if !single_path_component(&file_name) {
                    return Err((StatusCode::BAD_REQUEST, "Invalid file name".to_owned()));
                }

                let title = title
                    .take()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| stem_of(&file_name));
                // The title names the storage folder, so it gets the same
                // traversal check as the filename.
                if !single_path_component(&title) {
                    return Err((StatusCode::BAD_REQUEST, "Invalid title".to_owned()));
                }

                let new = NewVideo {
                    title,
                    description: description.take(),
                    original_filename: file_name,
                };
                let video = state.videos.insert(new).await.map_err(internal_error)?;

                let target = video.source_abs(&state.config.media_root);
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(internal_error)?;
                }
                tracing::info!(video_id = video.id, path = %target.display(), "saving upload");
                stream_to_file(&target, field).await?;

                state.dispatcher.video_created(video.id).await;
                return Ok((StatusCode::CREATED, Json(video)));
            }
        }
    }

    Err((StatusCode::BAD_REQUEST, "missing file field".to_owned()))
}

// Save a `Stream` to a file
async fn stream_to_file<S, E>(path: &Path, stream: S) -> Result<(), (StatusCode, String)>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    async {
        let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
        let body_reader = StreamReader::new(body_with_io_error);
        futures::pin_mut!(body_reader);

        let mut file = BufWriter::new(File::create(path).await?);
        tokio::io::copy(&mut body_reader, &mut file).await?;

        Ok::<_, io::Error>(())
    }
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
}

fn stem_of(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_owned())
}

fn single_path_component(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn bad_request(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn internal_error(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stream_to_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");

        type E = std::io::Error;

        let test_data = "Hello, world!";
        let mock_stream = stream::iter(vec![Ok::<Bytes, E>(Bytes::from(test_data))]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_ok());

        let file_contents = fs::read_to_string(file_path).unwrap();
        assert_eq!(file_contents, test_data);
    }

    #[tokio::test]
    async fn test_stream_to_file_error() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");

        let mock_stream = stream::iter(vec![Err("Test error")]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err(),
            (StatusCode::INTERNAL_SERVER_ERROR, "Test error".to_string())
        );
    }

    #[test]
    fn plain_filenames_are_accepted() {
        assert!(single_path_component("movie.mp4"));
        assert!(single_path_component("Sintel"));
    }

    #[test]
    fn traversal_filenames_are_rejected() {
        assert!(!single_path_component("../movie.mp4"));
        assert!(!single_path_component("/etc/passwd"));
        assert!(!single_path_component("a/b.mp4"));
        assert!(!single_path_component(""));
    }

    #[test]
    fn stem_of_strips_the_extension() {
        assert_eq!(stem_of("movie.final.mp4"), "movie.final");
        assert_eq!(stem_of("clip"), "clip");
    }
}
