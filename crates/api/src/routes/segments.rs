use axum::routing::post;
use axum::Router;

use crate::handlers::segments;
use crate::state::AppState;

/// Routes mounted at `/segments`.
pub fn router() -> Router<AppState> {
    Router::new().route("/closest", post(segments::closest_segments))
}
