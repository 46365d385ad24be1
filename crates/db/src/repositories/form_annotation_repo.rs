//! Repository for the `form_annotations` table.

use engage_core::types::DbId;
use sqlx::PgPool;

use crate::models::form_annotation::{FormAnnotation, NewFormAnnotation, UpdateFormAnnotation};

/// Column list for form_annotations queries.
const COLUMNS: &str = "id, video_id, form_id, timestamp_secs, segment_uri, segment_start, \
    segment_end, segment_duration, created_at, updated_at";

/// Provides append, patch and delete operations for form annotations.
pub struct FormAnnotationRepo;

impl FormAnnotationRepo {
    /// Append a batch of annotations to a video in one transaction.
    ///
    /// Each annotation is its own row, so concurrent batches for the same
    /// video never overwrite each other. Either the whole batch lands or
    /// nothing does.
    pub async fn append(
        pool: &PgPool,
        video_id: DbId,
        input: &[NewFormAnnotation],
    ) -> Result<Vec<FormAnnotation>, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_annotations
                (video_id, form_id, timestamp_secs, segment_uri,
                 segment_start, segment_end, segment_duration)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(input.len());
        for item in input {
            let segment = &item.selected_segment;
            let row = sqlx::query_as::<_, FormAnnotation>(&query)
                .bind(video_id)
                .bind(&item.form_id)
                .bind(item.timestamp)
                .bind(&segment.uri)
                .bind(segment.start)
                .bind(segment.end)
                .bind(segment.duration)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }
        tx.commit().await?;

        Ok(created)
    }

    /// List a video's annotations in submission order.
    pub async fn list_by_video(
        pool: &PgPool,
        video_id: DbId,
    ) -> Result<Vec<FormAnnotation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_annotations
             WHERE video_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, FormAnnotation>(&query)
            .bind(video_id)
            .fetch_all(pool)
            .await
    }

    /// Patch the timestamp and/or bound segment of one annotation.
    ///
    /// A segment replacement overwrites all four segment columns together.
    pub async fn update(
        pool: &PgPool,
        video_id: DbId,
        form_id: &str,
        input: &UpdateFormAnnotation,
    ) -> Result<Option<FormAnnotation>, sqlx::Error> {
        let query = format!(
            "UPDATE form_annotations SET
                timestamp_secs = COALESCE($1, timestamp_secs),
                segment_uri = COALESCE($2, segment_uri),
                segment_start = COALESCE($3, segment_start),
                segment_end = COALESCE($4, segment_end),
                segment_duration = COALESCE($5, segment_duration),
                updated_at = NOW()
             WHERE video_id = $6 AND form_id = $7
             RETURNING {COLUMNS}"
        );
        let segment = input.selected_segment.as_ref();
        sqlx::query_as::<_, FormAnnotation>(&query)
            .bind(input.timestamp)
            .bind(segment.map(|s| s.uri.as_str()))
            .bind(segment.map(|s| s.start))
            .bind(segment.map(|s| s.end))
            .bind(segment.map(|s| s.duration))
            .bind(video_id)
            .bind(form_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete one annotation. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, video_id: DbId, form_id: &str) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM form_annotations WHERE video_id = $1 AND form_id = $2")
                .bind(video_id)
                .bind(form_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
