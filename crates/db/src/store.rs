//! Collaborator traits for the catalog and the annotation store.
//!
//! The API holds these as trait objects so the same handlers run against
//! PostgreSQL ([`PgStore`]) or the in-process [`MemoryStore`].
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

use async_trait::async_trait;
use engage_core::error::CoreError;
use engage_core::types::DbId;

use crate::models::form_annotation::{FormAnnotation, NewFormAnnotation, UpdateFormAnnotation};
use crate::models::video::{CreateVideo, Video};
use crate::repositories::{FormAnnotationRepo, VideoRepo};
use crate::DbPool;

/// Read/write access to the video catalog.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn list_videos(&self) -> Result<Vec<Video>, CoreError>;

    async fn find_video(&self, id: DbId) -> Result<Option<Video>, CoreError>;

    /// Register a video unless its url is already known. `None` means it was.
    async fn register_video(&self, input: &CreateVideo) -> Result<Option<Video>, CoreError>;
}

/// Durable per-video collection of form annotations.
///
/// Implementations must make [`append_annotations`] atomic: a batch either
/// lands entirely or not at all, and concurrent batches for the same video
/// never lose each other's rows. A `(video_id, form_id)` pair that already
/// exists is a [`CoreError::Conflict`].
///
/// [`append_annotations`]: AnnotationStore::append_annotations
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    async fn append_annotations(
        &self,
        video_id: DbId,
        input: &[NewFormAnnotation],
    ) -> Result<Vec<FormAnnotation>, CoreError>;

    /// A video's annotations in submission order.
    async fn list_annotations(&self, video_id: DbId) -> Result<Vec<FormAnnotation>, CoreError>;

    async fn update_annotation(
        &self,
        video_id: DbId,
        form_id: &str,
        input: &UpdateFormAnnotation,
    ) -> Result<Option<FormAnnotation>, CoreError>;

    async fn delete_annotation(&self, video_id: DbId, form_id: &str) -> Result<bool, CoreError>;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> Result<(), CoreError>;
}

/// Map a sqlx error onto the domain taxonomy.
///
/// - Unique violations (`23505`) become [`CoreError::Conflict`].
/// - Foreign key violations (`23503`) mean the parent video vanished.
/// - Everything else is a [`CoreError::Storage`].
pub fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            Some("23503") => {
                return CoreError::not_found("Video", "referenced by annotation");
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}

/// PostgreSQL-backed catalog and annotation store.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoCatalog for PgStore {
    async fn list_videos(&self) -> Result<Vec<Video>, CoreError> {
        VideoRepo::list(&self.pool).await.map_err(map_sqlx_error)
    }

    async fn find_video(&self, id: DbId) -> Result<Option<Video>, CoreError> {
        VideoRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn register_video(&self, input: &CreateVideo) -> Result<Option<Video>, CoreError> {
        VideoRepo::create_if_absent(&self.pool, input)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl AnnotationStore for PgStore {
    async fn append_annotations(
        &self,
        video_id: DbId,
        input: &[NewFormAnnotation],
    ) -> Result<Vec<FormAnnotation>, CoreError> {
        FormAnnotationRepo::append(&self.pool, video_id, input)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_annotations(&self, video_id: DbId) -> Result<Vec<FormAnnotation>, CoreError> {
        FormAnnotationRepo::list_by_video(&self.pool, video_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_annotation(
        &self,
        video_id: DbId,
        form_id: &str,
        input: &UpdateFormAnnotation,
    ) -> Result<Option<FormAnnotation>, CoreError> {
        FormAnnotationRepo::update(&self.pool, video_id, form_id, input)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_annotation(&self, video_id: DbId, form_id: &str) -> Result<bool, CoreError> {
        FormAnnotationRepo::delete(&self.pool, video_id, form_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
