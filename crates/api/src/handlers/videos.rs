//! Handlers for the video catalog.

use axum::extract::{Path, State};
use axum::Json;
use engage_core::types::DbId;
use engage_db::models::video::Video;

use crate::error::AppResult;
use crate::handlers::playlist::ensure_video_exists;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/videos
pub async fn list_videos(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Video>>>> {
    let videos = state.videos.list_videos().await?;
    Ok(Json(DataResponse { data: videos }))
}

/// GET /api/videos/{id}
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Video>>> {
    let video = ensure_video_exists(&state, id).await?;
    Ok(Json(DataResponse { data: video }))
}
