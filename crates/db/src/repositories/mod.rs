//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument.

pub mod form_annotation_repo;
pub mod video_repo;

pub use form_annotation_repo::FormAnnotationRepo;
pub use video_repo::VideoRepo;
