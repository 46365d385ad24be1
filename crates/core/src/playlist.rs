//! Parser for VOD-style extended M3U playlists.
//!
//! The parser keeps just enough structure to re-serialize the playlist: the
//! header block verbatim, each segment with the directive lines that travel
//! with it, and whatever trails the last segment. Unknown directives are
//! never interpreted, only carried.

use std::fmt;

use crate::error::CoreError;
use crate::timing;
use crate::types::Seconds;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Top-level tag every extended playlist must open with.
pub const PLAYLIST_HEADER: &str = "#EXTM3U";

/// Per-segment duration directive.
pub const DURATION_DIRECTIVE: &str = "#EXTINF:";

/// End-of-list directive of a VOD playlist.
pub const END_LIST_DIRECTIVE: &str = "#EXT-X-ENDLIST";

/// File extensions recognised as media segment references.
pub const MEDIA_SEGMENT_EXTENSIONS: &[&str] = &[".ts", ".m4s", ".aac", ".mp4", ".m4a", ".vtt"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One media chunk referenced by the playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Path exactly as written in the source playlist.
    pub uri: String,
    /// Duration in seconds.
    pub duration: Seconds,
    /// Offset of the first frame, filled in by [`timing::reconstruct_timing`].
    pub start: Seconds,
    /// `start + duration`, filled in by [`timing::reconstruct_timing`].
    pub end: Seconds,
    /// The `#EXTINF` line as written, re-emitted untouched.
    pub duration_line: String,
    /// Directive lines of this segment's block that precede `#EXTINF`.
    pub leading_lines: Vec<String>,
    /// Directive lines between `#EXTINF` and the URI (e.g. `#EXT-X-BYTERANGE`).
    pub inner_lines: Vec<String>,
}

impl Segment {
    /// Build an untimed segment with a canonical `#EXTINF` line.
    pub fn new(uri: impl Into<String>, duration: Seconds) -> Self {
        Self {
            uri: uri.into(),
            duration,
            start: 0.0,
            end: 0.0,
            duration_line: format!("{DURATION_DIRECTIVE}{duration},"),
            leading_lines: Vec::new(),
            inner_lines: Vec::new(),
        }
    }
}

/// Structured form of a pristine source playlist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playlist {
    /// Lines before the first segment's block, blank lines included.
    pub header_lines: Vec<String>,
    /// Segments in source order. Never reordered.
    pub segments: Vec<Segment>,
    /// Non-blank lines after the last segment, minus the end-of-list marker.
    pub footer_lines: Vec<String>,
    /// Whether the source carried `#EXT-X-ENDLIST`.
    pub end_list: bool,
}

/// A segment whose duration directive is missing or unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentIssue {
    /// 1-based line number of the segment URI.
    pub line: usize,
    pub uri: String,
    pub reason: String,
}

impl fmt::Display for SegmentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} ({}): {}", self.line, self.uri, self.reason)
    }
}

/// Errors produced while parsing playlist text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaylistError {
    /// The text does not open with `#EXTM3U`; it is not a playlist at all.
    #[error("not an extended M3U playlist: missing {PLAYLIST_HEADER} header")]
    NotAPlaylist,

    /// One or more segments lack a usable duration.
    #[error("{} segment(s) without a usable duration: {}", .0.len(), join_issues(.0))]
    Segments(Vec<SegmentIssue>),
}

fn join_issues(issues: &[SegmentIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Whether a (trimmed) line references a media segment.
pub fn is_segment_line(line: &str) -> bool {
    if line.is_empty() || line.starts_with('#') {
        return false;
    }
    let path = line.split(['?', '#']).next().unwrap_or(line).to_ascii_lowercase();
    MEDIA_SEGMENT_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(ext))
}

/// Parse the numeric part of an `#EXTINF:<duration>[,<title>]` line.
pub fn parse_duration(line: &str) -> Result<Seconds, String> {
    let rest = line
        .trim()
        .strip_prefix(DURATION_DIRECTIVE)
        .ok_or_else(|| format!("expected {DURATION_DIRECTIVE} directive, got '{line}'"))?;
    let raw = rest.split(',').next().unwrap_or_default().trim();
    let duration: Seconds = raw
        .parse()
        .map_err(|_| format!("invalid duration '{raw}'"))?;
    if !duration.is_finite() {
        return Err(format!("duration '{raw}' is not a finite number"));
    }
    Ok(duration)
}

fn is_duration_line(line: &str) -> bool {
    line.trim_start().starts_with(DURATION_DIRECTIVE)
}

impl Playlist {
    /// Parse raw playlist text.
    ///
    /// Accepts `\n` and `\r\n` line endings. Every segment is checked before
    /// failing, so [`PlaylistError::Segments`] lists all offending segments.
    pub fn parse(text: &str) -> Result<Self, PlaylistError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let first = text.lines().map(str::trim).find(|l| !l.is_empty());
        if first != Some(PLAYLIST_HEADER) {
            return Err(PlaylistError::NotAPlaylist);
        }

        let mut playlist = Playlist::default();
        let mut issues = Vec::new();
        // Lines seen since the previous segment URI (or since the top).
        let mut block: Vec<&str> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();

            if line == END_LIST_DIRECTIVE {
                playlist.end_list = true;
                continue;
            }

            if !is_segment_line(line) {
                // Blank lines only matter inside the header block.
                if !line.is_empty() || (playlist.segments.is_empty() && issues.is_empty()) {
                    block.push(raw);
                }
                continue;
            }

            let first_block = playlist.segments.is_empty() && issues.is_empty();
            let extinf_at = block.iter().rposition(|l| is_duration_line(l));

            let (leading, duration_line, inner) = match extinf_at {
                Some(pos) => (&block[..pos], Some(block[pos]), &block[pos + 1..]),
                None => (&block[..], None, &block[block.len()..]),
            };

            let mut leading: Vec<String> = leading
                .iter()
                .filter(|l| first_block || !l.trim().is_empty())
                .map(|l| (*l).to_string())
                .collect();
            if first_block {
                playlist.header_lines.append(&mut leading);
            }

            let parsed = match duration_line {
                Some(dl) => parse_duration(dl).map(|d| (d, dl)),
                None => Err(format!("missing {DURATION_DIRECTIVE} directive")),
            };

            match parsed {
                Ok((duration, dl)) => playlist.segments.push(Segment {
                    uri: line.to_string(),
                    duration,
                    start: 0.0,
                    end: 0.0,
                    duration_line: dl.trim().to_string(),
                    leading_lines: leading,
                    inner_lines: inner
                        .iter()
                        .filter(|l| !l.trim().is_empty())
                        .map(|l| (*l).to_string())
                        .collect(),
                }),
                Err(reason) => issues.push(SegmentIssue {
                    line: idx + 1,
                    uri: line.to_string(),
                    reason,
                }),
            }

            block.clear();
        }

        if !issues.is_empty() {
            return Err(PlaylistError::Segments(issues));
        }

        let trailing = block.into_iter().map(str::to_string);
        if playlist.segments.is_empty() {
            playlist.header_lines.extend(trailing);
        } else {
            playlist.footer_lines = trailing.filter(|l| !l.trim().is_empty()).collect();
        }

        tracing::trace!(
            segments = playlist.segments.len(),
            header_lines = playlist.header_lines.len(),
            end_list = playlist.end_list,
            "Parsed playlist"
        );

        Ok(playlist)
    }

    /// Populate `start`/`end` on every segment. Returns the total duration.
    pub fn reconstruct_timing(&mut self) -> Result<Seconds, CoreError> {
        timing::reconstruct_timing(&mut self.segments)
    }

    /// Nominal playback duration (end of the last segment once timed).
    pub fn total_duration(&self) -> Seconds {
        self.segments.last().map_or(0.0, |s| s.end)
    }
}
