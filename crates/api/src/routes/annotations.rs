//! Route definitions for form annotations.
//!
//! The single-segment path is shared: `GET` reads it as a video id, `PUT`
//! and `DELETE` read it as a form id (the video id travels in the body).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::annotations;
use crate::state::AppState;

/// Routes mounted at `/annotations`.
///
/// ```text
/// POST   /          submit_annotations
/// GET    /{id}      list_annotations     (id = video id)
/// PUT    /{id}      update_annotation    (id = form id)
/// DELETE /{id}      delete_annotation    (id = form id)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(annotations::submit_annotations))
        .route(
            "/{id}",
            get(annotations::list_annotations)
                .put(annotations::update_annotation)
                .delete(annotations::delete_annotation),
        )
}
