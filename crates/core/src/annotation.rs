//! Form annotations: the binding of a form to a playlist segment.
//!
//! Provides the typed entity consumed by the manifest rewriter and the
//! validation helpers applied to operator submissions.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::Seconds;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a form identifier.
pub const MAX_FORM_ID_LENGTH: usize = 128;

/// Maximum number of selections accepted in a single submission.
pub const MAX_SELECTIONS_PER_SUBMISSION: usize = 100;

/// Largest accepted timeline position (one billion seconds, about 31 years).
/// Keeps `START-DATE` a four-digit year well inside chrono's range.
pub const MAX_TIMESTAMP_SECS: Seconds = 1_000_000_000.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An operator-authored binding of a form to a segment.
///
/// `bound_segment` is a snapshot of the segment URI at submission time and is
/// matched against the current playlist by string equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub form_id: String,
    /// The instant the operator selected, in seconds.
    pub timestamp: Seconds,
    pub bound_segment: String,
}

impl Annotation {
    pub fn new(
        form_id: impl Into<String>,
        timestamp: Seconds,
        bound_segment: impl Into<String>,
    ) -> Self {
        Self {
            form_id: form_id.into(),
            timestamp,
            bound_segment: bound_segment.into(),
        }
    }
}

/// The segment an operator picked, as echoed back by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRef<'a> {
    pub uri: &'a str,
    pub start: Seconds,
    pub end: Seconds,
    pub duration: Seconds,
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a form identifier.
///
/// The id ends up inside quoted date-range attributes, so quotes and line
/// breaks are rejected along with empty and overlong ids.
pub fn validate_form_id(form_id: &str) -> Result<(), CoreError> {
    if form_id.trim().is_empty() {
        return Err(CoreError::Validation("formId must not be empty".to_string()));
    }
    if form_id.chars().count() > MAX_FORM_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "formId must be at most {MAX_FORM_ID_LENGTH} characters"
        )));
    }
    if form_id.contains(['"', '\r', '\n']) {
        return Err(CoreError::Validation(
            "formId must not contain quotes or line breaks".to_string(),
        ));
    }
    Ok(())
}

/// Validate a timeline position supplied by an operator.
pub fn validate_timestamp(timestamp: Seconds) -> Result<(), CoreError> {
    if !timestamp.is_finite() {
        return Err(CoreError::Validation(
            "timestamp must be a finite number".to_string(),
        ));
    }
    if timestamp < 0.0 {
        return Err(CoreError::Validation(format!(
            "timestamp must not be negative, got {timestamp}"
        )));
    }
    if timestamp > MAX_TIMESTAMP_SECS {
        return Err(CoreError::Validation(format!(
            "timestamp must be at most {MAX_TIMESTAMP_SECS} seconds, got {timestamp}"
        )));
    }
    Ok(())
}

/// Validate a selected segment reference.
pub fn validate_segment_ref(segment: &SegmentRef<'_>) -> Result<(), CoreError> {
    let uri = segment.uri.trim();
    if uri.is_empty() {
        return Err(CoreError::Validation(
            "selectedSegment.uri must not be empty".to_string(),
        ));
    }
    if uri.starts_with('#') || segment.uri.contains(['\r', '\n']) {
        return Err(CoreError::Validation(format!(
            "selectedSegment.uri '{uri}' is not a segment reference"
        )));
    }
    for (name, value) in [
        ("start", segment.start),
        ("end", segment.end),
        ("duration", segment.duration),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::Validation(format!(
                "selectedSegment.{name} must be a non-negative number"
            )));
        }
    }
    if segment.end < segment.start {
        return Err(CoreError::Validation(
            "selectedSegment.end must not precede selectedSegment.start".to_string(),
        ));
    }
    Ok(())
}

/// Validate the shape of a submission batch given its form ids.
///
/// The batch must be non-empty, bounded by
/// [`MAX_SELECTIONS_PER_SUBMISSION`], and free of duplicate form ids.
pub fn validate_selection_batch<'a, I>(form_ids: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for form_id in form_ids {
        if !seen.insert(form_id) {
            return Err(CoreError::Validation(format!(
                "formId '{form_id}' appears more than once in the submission"
            )));
        }
    }
    if seen.is_empty() {
        return Err(CoreError::Validation(
            "selections must contain at least one entry".to_string(),
        ));
    }
    if seen.len() > MAX_SELECTIONS_PER_SUBMISSION {
        return Err(CoreError::Validation(format!(
            "at most {MAX_SELECTIONS_PER_SUBMISSION} selections per submission"
        )));
    }
    Ok(())
}
