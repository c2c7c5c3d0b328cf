//! HTTP API module.
//!
//! Serves the planning endpoints, plan history and health checks.

mod pages;
pub mod plan_store;
pub mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
