//! Engage API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! seeding) so integration tests and the binary entrypoint can both reach
//! them.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
