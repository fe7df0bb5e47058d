//! HTTP API for the furniture storefront.
//!
//! Wires the catalog service, user service and their backends behind an
//! axum router. Backends are selected by configuration so the whole
//! stack can run hermetically in memory for tests and local work.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::AppConfig;
pub use server::{FurnishServer, ServerBuilder, build_app};
pub use state::{AppState, build_state};
