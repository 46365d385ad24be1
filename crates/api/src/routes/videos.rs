//! Route definitions for the video catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::videos;
use crate::state::AppState;

/// Routes mounted at `/videos`.
///
/// ```text
/// GET    /          list_videos
/// GET    /{id}      get_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(videos::list_videos))
        .route("/{id}", get(videos::get_video))
}
