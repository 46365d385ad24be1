//! In-process catalog and annotation store.
//!
//! Used when no database is configured and by the test suites. Every
//! operation takes the single lock once, which gives appends the same
//! all-or-nothing behaviour as the PostgreSQL transaction.

use async_trait::async_trait;
use chrono::Utc;
use engage_core::error::CoreError;
use engage_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::form_annotation::{FormAnnotation, NewFormAnnotation, UpdateFormAnnotation};
use crate::models::video::{CreateVideo, Video};
use crate::store::{AnnotationStore, VideoCatalog};

#[derive(Debug, Default)]
struct Inner {
    videos: Vec<Video>,
    annotations: Vec<FormAnnotation>,
    last_video_id: DbId,
    last_annotation_id: DbId,
}

/// Lock-guarded in-memory store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoCatalog for MemoryStore {
    async fn list_videos(&self) -> Result<Vec<Video>, CoreError> {
        Ok(self.inner.read().await.videos.clone())
    }

    async fn find_video(&self, id: DbId) -> Result<Option<Video>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner.videos.iter().find(|v| v.id == id).cloned())
    }

    async fn register_video(&self, input: &CreateVideo) -> Result<Option<Video>, CoreError> {
        let mut inner = self.inner.write().await;
        if inner.videos.iter().any(|v| v.url == input.url) {
            return Ok(None);
        }
        inner.last_video_id += 1;
        let video = Video {
            id: inner.last_video_id,
            title: input.title.clone(),
            thumbnail: input.thumbnail.clone(),
            url: input.url.clone(),
            playlist_path: input.playlist_path.clone(),
            created_at: Utc::now(),
        };
        inner.videos.push(video.clone());
        Ok(Some(video))
    }
}

#[async_trait]
impl AnnotationStore for MemoryStore {
    async fn append_annotations(
        &self,
        video_id: DbId,
        input: &[NewFormAnnotation],
    ) -> Result<Vec<FormAnnotation>, CoreError> {
        let mut inner = self.inner.write().await;

        if !inner.videos.iter().any(|v| v.id == video_id) {
            return Err(CoreError::not_found("Video", video_id));
        }
        // Check the whole batch before touching anything.
        for (i, item) in input.iter().enumerate() {
            let clashes_stored = inner
                .annotations
                .iter()
                .any(|a| a.video_id == video_id && a.form_id == item.form_id);
            let clashes_batch = input[..i].iter().any(|prev| prev.form_id == item.form_id);
            if clashes_stored || clashes_batch {
                return Err(CoreError::Conflict(format!(
                    "formId '{}' already exists for video {video_id}",
                    item.form_id
                )));
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(input.len());
        for item in input {
            inner.last_annotation_id += 1;
            let segment = &item.selected_segment;
            created.push(FormAnnotation {
                id: inner.last_annotation_id,
                video_id,
                form_id: item.form_id.clone(),
                timestamp: item.timestamp,
                segment_uri: segment.uri.clone(),
                segment_start: segment.start,
                segment_end: segment.end,
                segment_duration: segment.duration,
                created_at: now,
                updated_at: now,
            });
        }
        inner.annotations.extend(created.iter().cloned());

        Ok(created)
    }

    async fn list_annotations(&self, video_id: DbId) -> Result<Vec<FormAnnotation>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .annotations
            .iter()
            .filter(|a| a.video_id == video_id)
            .cloned()
            .collect())
    }

    async fn update_annotation(
        &self,
        video_id: DbId,
        form_id: &str,
        input: &UpdateFormAnnotation,
    ) -> Result<Option<FormAnnotation>, CoreError> {
        let mut inner = self.inner.write().await;
        let Some(row) = inner
            .annotations
            .iter_mut()
            .find(|a| a.video_id == video_id && a.form_id == form_id)
        else {
            return Ok(None);
        };

        if let Some(timestamp) = input.timestamp {
            row.timestamp = timestamp;
        }
        if let Some(segment) = &input.selected_segment {
            row.segment_uri = segment.uri.clone();
            row.segment_start = segment.start;
            row.segment_end = segment.end;
            row.segment_duration = segment.duration;
        }
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete_annotation(&self, video_id: DbId, form_id: &str) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.annotations.len();
        inner
            .annotations
            .retain(|a| !(a.video_id == video_id && a.form_id == form_id));
        Ok(inner.annotations.len() < before)
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
