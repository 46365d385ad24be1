//! Segment timing reconstruction.
//!
//! A playlist stores durations only; absolute offsets are a prefix sum over
//! segment order.

use crate::error::CoreError;
use crate::playlist::Segment;
use crate::types::Seconds;

/// Fill `start`/`end` on every segment by running sum over `duration`.
///
/// Durations are trusted as given: no reordering, no clamping. Returns the
/// total duration. Negative or non-finite durations, and a running sum that
/// stops being finite, are rejected as validation failures.
pub fn reconstruct_timing(segments: &mut [Segment]) -> Result<Seconds, CoreError> {
    let mut cursor: Seconds = 0.0;

    for (index, segment) in segments.iter_mut().enumerate() {
        if !segment.duration.is_finite() {
            return Err(CoreError::Validation(format!(
                "segment {index} ({}) has a non-finite duration",
                segment.uri
            )));
        }
        if segment.duration < 0.0 {
            return Err(CoreError::Validation(format!(
                "segment {index} ({}) has negative duration {}",
                segment.uri, segment.duration
            )));
        }

        let end = cursor + segment.duration;
        if !end.is_finite() {
            return Err(CoreError::Validation(format!(
                "timeline overflows at segment {index} ({})",
                segment.uri
            )));
        }

        segment.start = cursor;
        segment.end = end;
        cursor = end;
    }

    Ok(cursor)
}
