#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use engage_api::config::ServerConfig;
use engage_api::router::build_app_router;
use engage_api::seed::seed_catalog;
use engage_api::state::AppState;
use engage_core::types::DbId;
use engage_db::memory::MemoryStore;
use engage_db::models::video::CreateVideo;
use engage_db::store::VideoCatalog;

/// Three 4-second segments, the canonical manifest fixture.
pub const SAMPLE_PLAYLIST: &str = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:4\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:4.000,\n\
seg0.ts\n\
#EXTINF:4.000,\n\
seg1.ts\n\
#EXTINF:4.000,\n\
seg2.ts\n\
#EXT-X-ENDLIST\n";

/// Six 2-second segments for nearest-segment queries.
pub const SHORT_PLAYLIST: &str = "#EXTM3U\n\
#EXT-X-TARGETDURATION:2\n\
#EXTINF:2,\nc0.ts\n\
#EXTINF:2,\nc1.ts\n\
#EXTINF:2,\nc2.ts\n\
#EXTINF:2,\nc3.ts\n\
#EXTINF:2,\nc4.ts\n\
#EXTINF:2,\nc5.ts\n\
#EXT-X-ENDLIST\n";

/// A segment whose duration cannot be read.
pub const BROKEN_PLAYLIST: &str = "#EXTM3U\n#EXTINF:abc,\nbad0.ts\n#EXT-X-ENDLIST\n";

pub const SAMPLE_VIDEO: &str = "Sample Video";
pub const SHORT_VIDEO: &str = "Short Clips";
pub const BROKEN_VIDEO: &str = "Broken Playlist";
pub const NOT_A_PLAYLIST_VIDEO: &str = "Not A Playlist";

/// Build a test `ServerConfig` serving assets from `assets_dir`.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(assets_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        assets_dir: assets_dir.to_path_buf(),
        assets_url_prefix: "/assets".to_string(),
        seed_assets: false,
        database_url: None,
        log_json: false,
    }
}

/// A running application over a temporary assets directory.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub assets: TempDir,
}

impl TestApp {
    /// Fresh router sharing this app's state.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Id of the seeded video with the given title.
    pub async fn video_id(&self, title: &str) -> DbId {
        self.store
            .list_videos()
            .await
            .unwrap()
            .into_iter()
            .find(|v| v.title == title)
            .unwrap_or_else(|| panic!("no seeded video titled '{title}'"))
            .id
    }

    /// Register a video whose playlist file does not exist.
    pub async fn register_missing_video(&self) -> DbId {
        self.store
            .register_video(&CreateVideo {
                title: "Missing".to_string(),
                thumbnail: None,
                url: "/assets/Missing/index.m3u8".to_string(),
                playlist_path: "Missing/index.m3u8".to_string(),
            })
            .await
            .unwrap()
            .unwrap()
            .id
    }
}

fn write_asset(root: &Path, folder: &str, file: &str, contents: &str) {
    let dir = root.join(folder);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(file), contents).unwrap();
}

/// Lay out the fixture videos, seed an in-memory catalog, and build the full
/// application router with the production middleware stack.
pub async fn build_test_app() -> TestApp {
    let assets = tempfile::tempdir().unwrap();
    let root = assets.path();

    write_asset(root, "Sample_Video", "index.m3u8", SAMPLE_PLAYLIST);
    write_asset(root, "Sample_Video", "thumb.jpg", "jpeg");
    for seg in ["seg0.ts", "seg1.ts", "seg2.ts"] {
        write_asset(root, "Sample_Video", seg, "ts-bytes");
    }
    write_asset(root, "Short_Clips", "index.m3u8", SHORT_PLAYLIST);
    write_asset(root, "Broken_Playlist", "index.m3u8", BROKEN_PLAYLIST);
    write_asset(root, "Not_A_Playlist", "index.m3u8", "<html>oops</html>\n");

    let store = Arc::new(MemoryStore::new());
    seed_catalog(store.as_ref(), root.to_path_buf(), "/assets".to_string())
        .await
        .unwrap();

    let config = test_config(root);
    let state = AppState {
        config: Arc::new(config.clone()),
        videos: store.clone(),
        annotations: store.clone(),
    };
    let router = build_app_router(state, &config).unwrap();

    TestApp {
        router,
        store,
        assets,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn delete_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::DELETE, uri, body).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A selection body for `POST /api/annotations`.
pub fn selection(form_id: &str, timestamp: f64, uri: &str, start: f64, duration: f64) -> Value {
    serde_json::json!({
        "formId": form_id,
        "timestamp": timestamp,
        "selectedSegment": {
            "uri": uri,
            "start": start,
            "end": start + duration,
            "duration": duration,
        },
    })
}
