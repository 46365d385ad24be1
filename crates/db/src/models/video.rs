//! Video catalog model and DTOs.

use engage_core::assets::DiscoveredVideo;
use engage_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `videos` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: DbId,
    pub title: String,
    pub thumbnail: Option<String>,
    /// Delivery path of the pristine playlist.
    pub url: String,
    /// Playlist path relative to the assets directory.
    pub playlist_path: String,
    pub created_at: Timestamp,
}

/// DTO for registering a video in the catalog.
#[derive(Debug, Clone)]
pub struct CreateVideo {
    pub title: String,
    pub thumbnail: Option<String>,
    pub url: String,
    pub playlist_path: String,
}

impl From<DiscoveredVideo> for CreateVideo {
    fn from(found: DiscoveredVideo) -> Self {
        Self {
            title: found.title,
            thumbnail: found.thumbnail,
            url: found.url,
            playlist_path: found.playlist_path,
        }
    }
}
