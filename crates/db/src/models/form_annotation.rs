//! Form annotation model and DTOs.

use engage_core::annotation::{Annotation, SegmentRef};
use engage_core::types::{DbId, Seconds, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `form_annotations` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FormAnnotation {
    pub id: DbId,
    pub video_id: DbId,
    pub form_id: String,
    #[sqlx(rename = "timestamp_secs")]
    pub timestamp: Seconds,
    /// URI snapshot of the segment chosen at submission time.
    pub segment_uri: String,
    pub segment_start: Seconds,
    pub segment_end: Seconds,
    pub segment_duration: Seconds,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FormAnnotation {
    /// The engine's view of this row.
    pub fn to_annotation(&self) -> Annotation {
        Annotation::new(self.form_id.clone(), self.timestamp, self.segment_uri.clone())
    }
}

/// The segment an operator picked, as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedSegment {
    pub uri: String,
    pub start: Seconds,
    pub end: Seconds,
    pub duration: Seconds,
}

impl SelectedSegment {
    pub fn to_segment_ref(&self) -> SegmentRef<'_> {
        SegmentRef {
            uri: &self.uri,
            start: self.start,
            end: self.end,
            duration: self.duration,
        }
    }
}

/// DTO for appending one annotation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFormAnnotation {
    pub form_id: String,
    pub timestamp: Seconds,
    pub selected_segment: SelectedSegment,
}

/// DTO for patching an annotation; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormAnnotation {
    pub timestamp: Option<Seconds>,
    pub selected_segment: Option<SelectedSegment>,
}

impl UpdateFormAnnotation {
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none() && self.selected_segment.is_none()
    }
}
