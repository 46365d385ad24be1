//! Handler for the rewritten manifest.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use engage_core::annotation::Annotation;
use engage_core::assets::asset_base_path;
use engage_core::manifest::{render_manifest, MANIFEST_CONTENT_TYPE};
use engage_core::types::DbId;
use engage_db::models::form_annotation::FormAnnotation;

use crate::error::AppResult;
use crate::handlers::playlist::load_timed_playlist;
use crate::state::AppState;

/// GET /api/manifest/{video_id}
///
/// Serve the video's playlist with segment URIs rewritten to delivery paths
/// and one date-range tag per bound form. Annotations pointing at segments
/// the playlist no longer has are left out, never failing the response.
pub async fn serve_manifest(
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<Response> {
    let (video, playlist) = load_timed_playlist(&state, video_id).await?;

    let annotations: Vec<Annotation> = state
        .annotations
        .list_annotations(video_id)
        .await?
        .iter()
        .map(FormAnnotation::to_annotation)
        .collect();

    let base = asset_base_path(&state.config.assets_url_prefix, &video.playlist_path);
    let rendered = render_manifest(&playlist, &annotations, &base);

    if !rendered.stale.is_empty() {
        tracing::warn!(
            video_id,
            stale = ?rendered.stale,
            "Annotations bound to segments absent from the playlist were skipped"
        );
    }
    tracing::debug!(
        video_id,
        segments = playlist.segments.len(),
        annotations = annotations.len(),
        "Serving manifest"
    );

    Ok((
        [(CONTENT_TYPE, MANIFEST_CONTENT_TYPE), (CACHE_CONTROL, "no-cache")],
        rendered.body,
    )
        .into_response())
}
