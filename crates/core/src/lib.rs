//! Playlist timing and marker injection engine.
//!
//! Everything in this crate is pure and request-scoped: a playlist is parsed,
//! timed and rendered on every call, and no state survives between calls.

pub mod annotation;
pub mod assets;
pub mod error;
pub mod manifest;
pub mod nearest;
pub mod playlist;
pub mod timing;
pub mod types;
