//! Repository for the `videos` table.

use engage_core::types::DbId;
use sqlx::PgPool;

use crate::models::video::{CreateVideo, Video};

/// Column list for videos queries.
const COLUMNS: &str = "id, title, thumbnail, url, playlist_path, created_at";

/// Provides catalog operations for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// List every video, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos ORDER BY id ASC");
        sqlx::query_as::<_, Video>(&query).fetch_all(pool).await
    }

    /// Find a video by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a video unless one with the same url exists.
    ///
    /// Returns `None` when the url was already registered.
    pub async fn create_if_absent(
        pool: &PgPool,
        input: &CreateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (title, thumbnail, url, playlist_path)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (url) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(&input.title)
            .bind(&input.thumbnail)
            .bind(&input.url)
            .bind(&input.playlist_path)
            .fetch_optional(pool)
            .await
    }
}
