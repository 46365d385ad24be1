//! Asset directory discovery and delivery-path helpers.
//!
//! Each immediate subdirectory of the assets directory that holds a `.m3u8`
//! file is one video. The directory is only ever read.

use std::path::Path;

use crate::error::CoreError;

/// Playlist file extension.
pub const PLAYLIST_EXTENSION: &str = "m3u8";

/// Image extensions accepted as thumbnails.
pub const THUMBNAIL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// A video found on disk, ready to be registered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredVideo {
    /// Folder name with underscores turned into spaces.
    pub title: String,
    /// Delivery path of the thumbnail, if the folder has one.
    pub thumbnail: Option<String>,
    /// Delivery path of the pristine playlist.
    pub url: String,
    /// Playlist path relative to the assets directory.
    pub playlist_path: String,
}

/// Join a delivery base path and a relative reference with forward slashes.
///
/// Backslashes are normalised since the result travels over HTTP. Absolute
/// URLs are returned unchanged.
pub fn join_asset_path(base: &str, relative: &str) -> String {
    if relative.contains("://") {
        return relative.to_string();
    }
    let base = base.replace('\\', "/");
    let relative = relative.replace('\\', "/");
    let base = base.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    if base.is_empty() {
        format!("/{relative}")
    } else {
        format!("{base}/{relative}")
    }
}

/// Delivery prefix of the directory holding `playlist_path`.
///
/// `asset_base_path("/assets", "Big_Buck/index.m3u8")` is `/assets/Big_Buck`.
pub fn asset_base_path(url_prefix: &str, playlist_path: &str) -> String {
    let normalised = playlist_path.replace('\\', "/");
    match normalised.rsplit_once('/') {
        Some((dir, _)) => join_asset_path(url_prefix, dir),
        None => url_prefix.trim_end_matches('/').to_string(),
    }
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Scan `assets_dir` for video folders.
///
/// Folders without a playlist are skipped with a warning. Results are sorted
/// by folder name; within a folder the alphabetically first playlist and
/// thumbnail win.
pub fn discover_videos(
    assets_dir: &Path,
    url_prefix: &str,
) -> Result<Vec<DiscoveredVideo>, CoreError> {
    let read_dir = |dir: &Path| {
        std::fs::read_dir(dir).map_err(|e| {
            CoreError::Storage(format!("cannot read assets directory {}: {e}", dir.display()))
        })
    };

    let mut folders = Vec::new();
    for entry in read_dir(assets_dir)? {
        let entry = entry.map_err(|e| CoreError::Storage(e.to_string()))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            if let Some(name) = entry.file_name().to_str() {
                folders.push(name.to_string());
            }
        }
    }
    folders.sort();

    let mut videos = Vec::new();
    for folder in folders {
        let mut files: Vec<String> = read_dir(&assets_dir.join(&folder))?
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        files.sort();

        let Some(playlist) = files.iter().find(|f| has_extension(f, &[PLAYLIST_EXTENSION])) else {
            tracing::warn!(folder = %folder, "Skipping asset folder without a playlist");
            continue;
        };
        let thumbnail = files
            .iter()
            .find(|f| has_extension(f, THUMBNAIL_EXTENSIONS))
            .map(|f| join_asset_path(url_prefix, &format!("{folder}/{f}")));

        let playlist_path = format!("{folder}/{playlist}");
        videos.push(DiscoveredVideo {
            title: folder.replace('_', " "),
            thumbnail,
            url: join_asset_path(url_prefix, &playlist_path),
            playlist_path,
        });
    }

    Ok(videos)
}
