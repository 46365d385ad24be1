pub mod annotations;
pub mod health;
pub mod manifest;
pub mod segments;
pub mod videos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /videos                          list videos
/// /videos/{id}                     get video
///
/// /manifest/{video_id}             annotated playlist (text/x-mpegURL)
///
/// /segments/closest                nearest segments to a timestamp (POST)
///
/// /annotations                     submit a batch of selections (POST)
/// /annotations/{video_id}          list a video's annotations (GET)
/// /annotations/{form_id}           update (PUT), delete (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/videos", videos::router())
        .nest("/manifest", manifest::router())
        .nest("/segments", segments::router())
        .nest("/annotations", annotations::router())
}
