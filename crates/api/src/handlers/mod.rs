pub mod annotations;
pub mod manifest;
pub mod playlist;
pub mod segments;
pub mod videos;
