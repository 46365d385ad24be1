//! Startup registration of videos found under the assets directory.

use std::path::PathBuf;

use engage_core::assets::discover_videos;
use engage_core::error::CoreError;
use engage_db::models::video::CreateVideo;
use engage_db::store::VideoCatalog;

/// Outcome of a seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub added: usize,
    pub skipped: usize,
}

/// Scan `assets_dir` and register every video the catalog does not know yet.
///
/// Videos are matched by delivery url, so running this repeatedly is safe.
pub async fn seed_catalog(
    catalog: &dyn VideoCatalog,
    assets_dir: PathBuf,
    url_prefix: String,
) -> Result<SeedReport, CoreError> {
    let found = tokio::task::spawn_blocking(move || discover_videos(&assets_dir, &url_prefix))
        .await
        .map_err(|e| CoreError::Internal(format!("asset scan task failed: {e}")))??;

    let mut report = SeedReport::default();
    for video in found {
        let title = video.title.clone();
        match catalog.register_video(&CreateVideo::from(video)).await? {
            Some(created) => {
                tracing::info!(video_id = created.id, title = %title, "Registered video");
                report.added += 1;
            }
            None => {
                tracing::debug!(title = %title, "Video already registered");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}
