//! Nearest-segment lookup for operator selection.

use crate::playlist::Segment;
use crate::types::Seconds;

/// Number of candidate segments offered to an operator.
pub const DEFAULT_NEAREST_COUNT: usize = 4;

/// Upper bound on a caller-requested candidate count.
pub const MAX_NEAREST_COUNT: usize = 20;

/// Return up to `k` segments whose start offsets are closest to `t`.
///
/// Selection is by `|start - t|`, ties going to the earlier segment. The
/// selected subset is then re-sorted ascending by `start`, so the result reads
/// as a range even though it was chosen by proximity. Segments must already
/// be timed. `t` may lie outside the playlist.
pub fn nearest_segments(segments: &[Segment], t: Seconds, k: usize) -> Vec<&Segment> {
    let mut ranked: Vec<(usize, Seconds)> = segments
        .iter()
        .enumerate()
        .map(|(i, s)| (i, (s.start - t).abs()))
        .collect();

    // Stable sort keeps original index order among equal distances.
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(k);

    let mut picked: Vec<usize> = ranked.into_iter().map(|(i, _)| i).collect();
    picked.sort_by(|&a, &b| {
        segments[a]
            .start
            .total_cmp(&segments[b].start)
            .then(a.cmp(&b))
    });

    picked.into_iter().map(|i| &segments[i]).collect()
}
