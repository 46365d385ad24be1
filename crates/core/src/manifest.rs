//! Manifest rewriting: delivery paths plus form-trigger date-range tags.
//!
//! The rewriter works on the pristine source playlist only. Its output is
//! served and never fed back into the parser.

use std::collections::HashMap;

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};

use crate::annotation::{validate_timestamp, Annotation};
use crate::assets::join_asset_path;
use crate::error::CoreError;
use crate::playlist::{Playlist, Segment, END_LIST_DIRECTIVE};
use crate::types::Seconds;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix of every signaling tag identifier.
pub const TAG_ID_PREFIX: &str = "engage_";

/// `CLASS` attribute marking a form-trigger date range.
pub const TAG_CLASS: &str = "form";

/// Content type of a served manifest.
pub const MANIFEST_CONTENT_TYPE: &str = "text/x-mpegURL";

/// Reference instant that annotation timestamps are offset from
/// (2025-06-29T12:00:00Z). Clients key on the resulting `START-DATE`.
pub fn reference_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 29, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Output of [`render_manifest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedManifest {
    /// Playlist text ready to serve.
    pub body: String,
    /// Form ids whose bound segment is absent from the playlist.
    pub stale: Vec<String>,
    /// Form ids whose timestamp cannot be rendered as a `START-DATE`.
    pub unrenderable: Vec<String>,
}

/// ISO-8601 `START-DATE` for an annotation timestamp, millisecond precision.
///
/// Sub-millisecond fractions are truncated. Timestamps that fail
/// [`validate_timestamp`] have no date and are rejected.
pub fn start_date(timestamp: Seconds) -> Result<String, CoreError> {
    validate_timestamp(timestamp)?;
    let millis = (timestamp * 1000.0).trunc() as i64;
    let instant = Duration::try_milliseconds(millis)
        .and_then(|offset| reference_epoch().checked_add_signed(offset))
        .ok_or_else(|| {
            CoreError::Validation(format!("timestamp {timestamp} is out of range"))
        })?;
    Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Build the form-trigger date-range tag for an annotation bound to `segment`.
///
/// `X-TIMESTAMP` carries the segment's end offset rather than the annotation's
/// own timestamp; clients compare playback position against segment
/// boundaries.
pub fn signaling_tag(annotation: &Annotation, segment: &Segment) -> Result<String, CoreError> {
    Ok(format!(
        "#EXT-X-DATERANGE:ID=\"{TAG_ID_PREFIX}{form_id}\",START-DATE=\"{start}\",\
CLASS=\"{TAG_CLASS}\",X-FORM-ID=\"{form_id}\",X-TIMESTAMP=\"{end}\"",
        form_id = annotation.form_id,
        start = start_date(annotation.timestamp)?,
        end = segment.end,
    ))
}

/// Re-serialize a timed playlist for delivery.
///
/// Header lines pass through verbatim, each segment URI is joined onto
/// `asset_base_path`, and every annotation bound to a segment yields one tag
/// right after that segment's URI, in annotation order. A URI that repeats
/// carries its tags at the first occurrence only, so no date-range ID is
/// emitted twice. Annotations whose segment no longer exists are skipped and
/// reported in [`RenderedManifest::stale`]; those whose timestamp has no
/// `START-DATE` are skipped and reported in [`RenderedManifest::unrenderable`].
pub fn render_manifest(
    playlist: &Playlist,
    annotations: &[Annotation],
    asset_base_path: &str,
) -> RenderedManifest {
    let mut by_segment: HashMap<&str, Vec<&Annotation>> = HashMap::new();
    for annotation in annotations {
        by_segment
            .entry(annotation.bound_segment.as_str())
            .or_default()
            .push(annotation);
    }

    let mut lines: Vec<String> = playlist.header_lines.clone();
    let mut unrenderable = Vec::new();

    for segment in &playlist.segments {
        lines.extend(segment.leading_lines.iter().cloned());
        lines.push(segment.duration_line.clone());
        lines.extend(segment.inner_lines.iter().cloned());
        lines.push(join_asset_path(asset_base_path, &segment.uri));

        let Some(bound) = by_segment.remove(segment.uri.as_str()) else {
            continue;
        };
        for annotation in bound {
            match signaling_tag(annotation, segment) {
                Ok(tag) => lines.push(tag),
                Err(e) => {
                    tracing::warn!(
                        form_id = %annotation.form_id,
                        error = %e,
                        "Skipping form tag with unrenderable timestamp"
                    );
                    unrenderable.push(annotation.form_id.clone());
                }
            }
        }
    }

    lines.extend(playlist.footer_lines.iter().cloned());
    lines.push(END_LIST_DIRECTIVE.to_string());

    // Whatever was not claimed by a segment is bound to a vanished URI.
    let stale = annotations
        .iter()
        .filter(|a| by_segment.contains_key(a.bound_segment.as_str()))
        .map(|a| a.form_id.clone())
        .collect();

    let mut body = lines.join("\n");
    body.push('\n');

    RenderedManifest {
        body,
        stale,
        unrenderable,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::annotation::MAX_TIMESTAMP_SECS;

    const SOURCE: &str = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:4\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:4.000,\n\
seg0.ts\n\
#EXTINF:4.000,\n\
seg1.ts\n\
#EXTINF:4.000,\n\
seg2.ts\n\
#EXT-X-ENDLIST\n";

    fn timed_source() -> Playlist {
        let mut playlist = Playlist::parse(SOURCE).unwrap();
        playlist.reconstruct_timing().unwrap();
        playlist
    }

    #[test]
    fn end_to_end_tag_follows_bound_segment() {
        let playlist = timed_source();
        let annotations = vec![Annotation::new("f1", 5.0, "seg1.ts")];
        let rendered = render_manifest(&playlist, &annotations, "/assets/movie");

        let expected = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:4\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:4.000,\n\
/assets/movie/seg0.ts\n\
#EXTINF:4.000,\n\
/assets/movie/seg1.ts\n\
#EXT-X-DATERANGE:ID=\"engage_f1\",START-DATE=\"2025-06-29T12:00:05.000Z\",CLASS=\"form\",X-FORM-ID=\"f1\",X-TIMESTAMP=\"8\"\n\
#EXTINF:4.000,\n\
/assets/movie/seg2.ts\n\
#EXT-X-ENDLIST\n";
        assert_eq!(rendered.body, expected);
        assert!(rendered.stale.is_empty());
    }

    #[test]
    fn rendering_is_byte_identical_across_calls() {
        let playlist = timed_source();
        let annotations = vec![
            Annotation::new("a", 1.25, "seg0.ts"),
            Annotation::new("b", 9.0, "seg2.ts"),
        ];
        let first = render_manifest(&playlist, &annotations, "/assets/movie");
        let second = render_manifest(&playlist, &annotations, "/assets/movie");
        assert_eq!(first.body, second.body);
    }

    #[test]
    fn stale_annotation_is_skipped_and_reported() {
        let playlist = timed_source();
        let annotations = vec![Annotation::new("gone", 3.0, "renamed_007.ts")];
        let rendered = render_manifest(&playlist, &annotations, "/assets/movie");

        assert!(!rendered.body.contains("EXT-X-DATERANGE"));
        assert_eq!(rendered.stale, vec!["gone".to_string()]);
        assert_eq!(rendered.body, render_manifest(&playlist, &[], "/assets/movie").body);
    }

    #[test]
    fn multiple_annotations_on_one_segment_keep_submission_order() {
        let playlist = timed_source();
        let annotations = vec![
            Annotation::new("second", 6.0, "seg1.ts"),
            Annotation::new("other", 1.0, "seg0.ts"),
            Annotation::new("first", 4.5, "seg1.ts"),
        ];
        let rendered = render_manifest(&playlist, &annotations, "/assets/movie");
        let lines: Vec<&str> = rendered.body.lines().collect();

        let uri_at = lines
            .iter()
            .position(|l| *l == "/assets/movie/seg1.ts")
            .unwrap();
        assert!(lines[uri_at + 1].contains("ID=\"engage_second\""));
        assert!(lines[uri_at + 2].contains("ID=\"engage_first\""));
        assert!(lines[uri_at + 3].starts_with("#EXTINF"));
    }

    #[test]
    fn end_list_is_emitted_last_even_when_source_lacks_it() {
        let mut playlist = Playlist::parse("#EXTM3U\n#EXTINF:2,\na.ts\n").unwrap();
        playlist.reconstruct_timing().unwrap();
        let rendered = render_manifest(&playlist, &[], "/assets/x");
        assert!(rendered.body.ends_with("/assets/x/a.ts\n#EXT-X-ENDLIST\n"));
    }

    #[test]
    fn footer_lines_precede_end_list() {
        let mut playlist =
            Playlist::parse("#EXTM3U\n#EXTINF:2,\na.ts\n#EXT-X-ENDLIST\n# note\n").unwrap();
        playlist.reconstruct_timing().unwrap();
        let rendered = render_manifest(&playlist, &[], "/assets/x");
        assert!(rendered.body.ends_with("a.ts\n# note\n#EXT-X-ENDLIST\n"));
    }

    #[test]
    fn segment_block_directives_are_carried() {
        let mut playlist = Playlist::parse(
            "#EXTM3U\n#EXTINF:2,\na.ts\n#EXT-X-DISCONTINUITY\n#EXTINF:2,\nb.ts\n",
        )
        .unwrap();
        playlist.reconstruct_timing().unwrap();
        let rendered = render_manifest(&playlist, &[], "/assets/x");
        assert!(rendered
            .body
            .contains("/assets/x/a.ts\n#EXT-X-DISCONTINUITY\n#EXTINF:2,\n/assets/x/b.ts\n"));
    }

    #[test]
    fn start_date_is_offset_from_reference_epoch() {
        assert_eq!(start_date(0.0).unwrap(), "2025-06-29T12:00:00.000Z");
        assert_eq!(start_date(5.0).unwrap(), "2025-06-29T12:00:05.000Z");
        assert_eq!(start_date(61.5).unwrap(), "2025-06-29T12:01:01.500Z");
        assert_eq!(start_date(3600.0).unwrap(), "2025-06-29T13:00:00.000Z");
    }

    #[test]
    fn start_date_truncates_sub_millisecond_fractions() {
        assert_eq!(start_date(0.0005).unwrap(), "2025-06-29T12:00:00.000Z");
        assert_eq!(start_date(1.2349).unwrap(), "2025-06-29T12:00:01.234Z");
    }

    #[test]
    fn start_date_stays_a_four_digit_year_at_the_bound() {
        let date = start_date(MAX_TIMESTAMP_SECS).unwrap();
        assert!(date.starts_with("2057-"), "{date}");
    }

    #[test]
    fn start_date_rejects_out_of_range_timestamps() {
        assert_matches!(start_date(1e12), Err(CoreError::Validation(_)));
        assert_matches!(start_date(1e300), Err(CoreError::Validation(_)));
        assert_matches!(start_date(-1.0), Err(CoreError::Validation(_)));
    }

    #[test]
    fn unrenderable_annotation_is_skipped_and_reported() {
        let playlist = timed_source();
        let annotations = vec![
            Annotation::new("far", 1e12, "seg1.ts"),
            Annotation::new("f1", 5.0, "seg1.ts"),
        ];
        let rendered = render_manifest(&playlist, &annotations, "/assets/movie");

        assert!(!rendered.body.contains("engage_far"));
        assert!(rendered.body.contains("ID=\"engage_f1\""));
        assert_eq!(rendered.unrenderable, vec!["far".to_string()]);
        assert!(rendered.stale.is_empty());
    }

    #[test]
    fn repeated_uri_carries_tags_at_first_occurrence_only() {
        let mut playlist =
            Playlist::parse("#EXTM3U\n#EXTINF:2,\nloop.ts\n#EXTINF:2,\nb.ts\n#EXTINF:2,\nloop.ts\n")
                .unwrap();
        playlist.reconstruct_timing().unwrap();
        let annotations = vec![Annotation::new("f1", 1.0, "loop.ts")];
        let rendered = render_manifest(&playlist, &annotations, "/assets/x");

        assert_eq!(rendered.body.matches("engage_f1").count(), 1);
        assert!(rendered
            .body
            .contains("/assets/x/loop.ts\n#EXT-X-DATERANGE:ID=\"engage_f1\""));
        assert!(rendered.body.contains("X-TIMESTAMP=\"2\""));
        assert!(rendered.stale.is_empty());
    }

    #[test]
    fn fractional_segment_end_is_written_plainly() {
        let mut segment = Segment::new("s.ts", 2.5);
        segment.start = 6.0;
        segment.end = 8.5;
        let tag = signaling_tag(&Annotation::new("q", 7.0, "s.ts"), &segment).unwrap();
        assert!(tag.ends_with("X-TIMESTAMP=\"8.5\""));
    }
}
