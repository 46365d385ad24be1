//! Handlers for form annotations.
//!
//! Submissions append to a video's collection; edits and deletes address a
//! single annotation by `(videoId, formId)`.

use axum::extract::{Path, State};
use axum::Json;
use engage_core::annotation::{
    validate_form_id, validate_segment_ref, validate_selection_batch, validate_timestamp,
};
use engage_core::error::CoreError;
use engage_core::types::{DbId, Seconds};
use engage_db::models::form_annotation::{
    FormAnnotation, NewFormAnnotation, SelectedSegment, UpdateFormAnnotation,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::playlist::ensure_video_exists;
use crate::response::{DataResponse, SuccessDataResponse, SuccessResponse};
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request bodies
   -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnnotationsRequest {
    pub video_id: DbId,
    pub selections: Vec<NewFormAnnotation>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnnotationsResponse {
    pub success: bool,
    pub created: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnotationRequest {
    pub video_id: DbId,
    pub timestamp: Option<Seconds>,
    pub selected_segment: Option<SelectedSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAnnotationRequest {
    pub video_id: DbId,
}

/* --------------------------------------------------------------------------
   Validation
   -------------------------------------------------------------------------- */

fn validate_selection(selection: &NewFormAnnotation) -> Result<(), CoreError> {
    validate_form_id(&selection.form_id)?;
    validate_timestamp(selection.timestamp)?;
    validate_segment_ref(&selection.selected_segment.to_segment_ref())
        .map_err(|e| prefix_validation(&selection.form_id, e))
}

fn prefix_validation(form_id: &str, err: CoreError) -> CoreError {
    match err {
        CoreError::Validation(msg) => CoreError::Validation(format!("{form_id}: {msg}")),
        other => other,
    }
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// POST /api/annotations
///
/// Append a batch of selections to a video. The batch is validated as a
/// whole first; either every selection is stored or none is.
pub async fn submit_annotations(
    State(state): State<AppState>,
    AppJson(input): AppJson<SubmitAnnotationsRequest>,
) -> AppResult<Json<SubmitAnnotationsResponse>> {
    validate_selection_batch(input.selections.iter().map(|s| s.form_id.as_str()))?;
    for selection in &input.selections {
        validate_selection(selection)?;
    }

    ensure_video_exists(&state, input.video_id).await?;

    let created = state
        .annotations
        .append_annotations(input.video_id, &input.selections)
        .await?;

    tracing::info!(
        video_id = input.video_id,
        created = created.len(),
        "Form annotations submitted"
    );

    Ok(Json(SubmitAnnotationsResponse {
        success: true,
        created: created.len(),
    }))
}

/// GET /api/annotations/{video_id}
///
/// List a video's annotations in submission order.
pub async fn list_annotations(
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FormAnnotation>>>> {
    ensure_video_exists(&state, video_id).await?;
    let annotations = state.annotations.list_annotations(video_id).await?;
    Ok(Json(DataResponse { data: annotations }))
}

/// PUT /api/annotations/{form_id}
///
/// Replace the timestamp and/or bound segment of one annotation.
pub async fn update_annotation(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    AppJson(input): AppJson<UpdateAnnotationRequest>,
) -> AppResult<Json<SuccessDataResponse<FormAnnotation>>> {
    let patch = UpdateFormAnnotation {
        timestamp: input.timestamp,
        selected_segment: input.selected_segment,
    };
    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "Provide timestamp and/or selectedSegment to update".to_string(),
        ));
    }
    if let Some(timestamp) = patch.timestamp {
        validate_timestamp(timestamp)?;
    }
    if let Some(segment) = &patch.selected_segment {
        validate_segment_ref(&segment.to_segment_ref())?;
    }

    let annotation = state
        .annotations
        .update_annotation(input.video_id, &form_id, &patch)
        .await?
        .ok_or_else(|| CoreError::not_found("FormAnnotation", &form_id))?;

    tracing::info!(
        video_id = input.video_id,
        form_id = %form_id,
        "Form annotation updated"
    );

    Ok(Json(SuccessDataResponse::ok(annotation)))
}

/// DELETE /api/annotations/{form_id}
///
/// Remove one annotation from a video.
pub async fn delete_annotation(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    AppJson(input): AppJson<DeleteAnnotationRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let deleted = state
        .annotations
        .delete_annotation(input.video_id, &form_id)
        .await?;

    if !deleted {
        return Err(CoreError::not_found("FormAnnotation", &form_id).into());
    }

    tracing::info!(
        video_id = input.video_id,
        form_id = %form_id,
        "Form annotation deleted"
    );

    Ok(Json(SuccessResponse::ok()))
}
