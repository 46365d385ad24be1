use std::sync::Arc;

use engage_db::store::{AnnotationStore, VideoCatalog};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Handlers keep no
/// state of their own between requests; the stores are the only shared
/// mutable resources.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Video catalog (which playlist belongs to which video).
    pub videos: Arc<dyn VideoCatalog>,
    /// Form annotation store.
    pub annotations: Arc<dyn AnnotationStore>,
}
