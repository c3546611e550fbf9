/// Common test utilities and fixtures
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use soundboard_core::{PlaybackHandle, SoundEngine};
use soundboard_library::{IngestConfig, LibraryManager, UrlIngestor};
use soundboard_playback::{PlaybackConfig, PlaybackDispatcher};
use soundboard_server::{api, config::ServerConfig, state::AppState};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "soundboard-test-boundary";

/// Engine that records what it was asked to play
#[derive(Default)]
pub struct RecordingEngine {
    pub played: Mutex<Vec<PathBuf>>,
    pub stop_all_calls: AtomicUsize,
}

impl RecordingEngine {
    pub fn played_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }
}

#[derive(Debug)]
pub struct RecordingHandle {
    active: AtomicBool,
}

impl PlaybackHandle for RecordingHandle {
    fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl SoundEngine for RecordingEngine {
    fn play(&self, path: &Path) -> soundboard_core::Result<Box<dyn PlaybackHandle>> {
        self.played.lock().unwrap().push(path.to_path_buf());
        Ok(Box::new(RecordingHandle {
            active: AtomicBool::new(true),
        }))
    }

    fn stop_all(&self) {
        self.stop_all_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub engine: Arc<RecordingEngine>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn root(&self) -> &Path {
        self.state.library.root()
    }

    /// Send a request and decode the JSON answer (Null when the body is not JSON)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn upload(
        &self,
        file: Option<(&str, &[u8])>,
        folder: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(file, folder)))
                .unwrap(),
        )
        .await
    }

    /// Wait for the playback worker to have served `count` plays
    pub async fn wait_for_plays(&self, count: usize) {
        for _ in 0..200 {
            if self.engine.played_count() >= count {
                // Let the worker store the handle after the engine returned
                tokio::time::sleep(Duration::from_millis(10)).await;
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("Playback worker did not serve {} plays", count);
    }
}

/// Build the full router over a fresh temporary library
pub fn create_test_app() -> TestApp {
    create_test_app_with(ServerConfig::default())
}

pub fn create_test_app_with(mut config: ServerConfig) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    config.library.root = temp_dir.path().to_path_buf();

    let library = LibraryManager::new(temp_dir.path()).unwrap();
    let ingestor = UrlIngestor::new(library.clone(), IngestConfig::default()).unwrap();
    let engine = Arc::new(RecordingEngine::default());
    let dispatcher = PlaybackDispatcher::start(
        library.resolver().clone(),
        engine.clone(),
        PlaybackConfig {
            report_missing: config.playback.report_missing,
            queue_capacity: config.playback.queue_capacity,
        },
    );

    let state = AppState::new(
        Arc::new(library),
        Arc::new(ingestor),
        Arc::new(dispatcher),
        Arc::new(config),
    );
    let router = api::router(state.clone(), None);

    TestApp {
        router,
        state,
        engine,
        temp_dir,
    }
}

/// Encode a multipart form with an optional `file` part and `folder` field
pub fn multipart_body(file: Option<(&str, &[u8])>, folder: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(folder) = folder {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"folder\"\r\n\r\n{}\r\n",
                BOUNDARY, folder
            )
            .as_bytes(),
        );
    }

    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
