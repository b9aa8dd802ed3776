//! Gatekit HTTP server.
//!
//! Wires the session engine, the account routes, and the guard middleware
//! into one axum application. The binary in `main.rs` adds configuration
//! loading, tracing, and the choice of revocation backend.

pub mod app;
pub mod config;
pub mod observability;

pub use app::build_router;
pub use config::AppConfig;
