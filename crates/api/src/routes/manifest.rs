use axum::routing::get;
use axum::Router;

use crate::handlers::manifest;
use crate::state::AppState;

/// Routes mounted at `/manifest`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{video_id}", get(manifest::serve_manifest))
}
