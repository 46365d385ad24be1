//! Handler for the nearest-segment query.

use axum::extract::State;
use axum::Json;
use engage_core::error::CoreError;
use engage_core::nearest::{nearest_segments, DEFAULT_NEAREST_COUNT, MAX_NEAREST_COUNT};
use engage_core::playlist::Segment;
use engage_core::types::{DbId, Seconds};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::playlist::load_timed_playlist;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosestSegmentsRequest {
    pub video_id: DbId,
    pub timestamp: Seconds,
    /// How many candidates to return (default 4).
    pub count: Option<usize>,
}

/// A candidate segment offered to the operator.
#[derive(Debug, Serialize)]
pub struct SegmentInfo {
    pub uri: String,
    pub start: Seconds,
    pub end: Seconds,
    pub duration: Seconds,
}

impl From<&Segment> for SegmentInfo {
    fn from(segment: &Segment) -> Self {
        Self {
            uri: segment.uri.clone(),
            start: segment.start,
            end: segment.end,
            duration: segment.duration,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClosestSegmentsResponse {
    pub success: bool,
    pub segments: Vec<SegmentInfo>,
}

/// POST /api/segments/closest
///
/// Return the segments whose start offsets are nearest to `timestamp`,
/// sorted ascending by start.
pub async fn closest_segments(
    State(state): State<AppState>,
    AppJson(input): AppJson<ClosestSegmentsRequest>,
) -> AppResult<Json<ClosestSegmentsResponse>> {
    if !input.timestamp.is_finite() {
        return Err(CoreError::Validation("timestamp must be a finite number".into()).into());
    }
    let count = input.count.unwrap_or(DEFAULT_NEAREST_COUNT);
    if count == 0 || count > MAX_NEAREST_COUNT {
        return Err(CoreError::Validation(format!(
            "count must be between 1 and {MAX_NEAREST_COUNT}"
        ))
        .into());
    }

    let (_video, playlist) = load_timed_playlist(&state, input.video_id).await?;
    let segments: Vec<SegmentInfo> = nearest_segments(&playlist.segments, input.timestamp, count)
        .into_iter()
        .map(SegmentInfo::from)
        .collect();

    tracing::debug!(
        video_id = input.video_id,
        timestamp = input.timestamp,
        found = segments.len(),
        "Closest segments resolved"
    );

    Ok(Json(ClosestSegmentsResponse {
        success: true,
        segments,
    }))
}
