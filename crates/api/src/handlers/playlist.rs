//! The shared load pipeline: video record -> playlist file -> parse -> timing.
//!
//! Every manifest and segment-lookup request runs this from scratch. Nothing
//! is cached; the pristine playlist on disk is the only input.

use engage_core::error::CoreError;
use engage_core::playlist::{Playlist, PlaylistError};
use engage_core::types::DbId;
use engage_db::models::video::Video;

use crate::error::AppResult;
use crate::state::AppState;

/// Fetch a video record or fail with 404.
pub async fn ensure_video_exists(state: &AppState, video_id: DbId) -> AppResult<Video> {
    let video = state
        .videos
        .find_video(video_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Video", video_id))?;
    Ok(video)
}

/// Load, parse and time the pristine playlist of a video.
///
/// - unknown video, missing file, or a file that is not a playlist: NotFound
/// - segments without a usable duration, or an invalid timeline: Parse
pub async fn load_timed_playlist(state: &AppState, video_id: DbId) -> AppResult<(Video, Playlist)> {
    let video = ensure_video_exists(state, video_id).await?;
    let path = state.config.assets_dir.join(&video.playlist_path);

    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(video_id, path = %path.display(), "Playlist file missing");
            return Err(CoreError::not_found("Playlist", video_id).into());
        }
        Err(e) => {
            return Err(CoreError::Storage(format!(
                "cannot read playlist {}: {e}",
                path.display()
            ))
            .into());
        }
    };

    let mut playlist = Playlist::parse(&text).map_err(|e| match e {
        PlaylistError::NotAPlaylist => {
            tracing::warn!(video_id, path = %path.display(), "File is not a playlist");
            CoreError::not_found("Playlist", video_id)
        }
        PlaylistError::Segments(_) => CoreError::Parse(e.to_string()),
    })?;

    playlist
        .reconstruct_timing()
        .map_err(|e| CoreError::Parse(e.to_string()))?;

    tracing::debug!(
        video_id,
        segments = playlist.segments.len(),
        total_duration = playlist.total_duration(),
        "Loaded playlist"
    );

    Ok((video, playlist))
}
