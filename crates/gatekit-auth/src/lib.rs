//! Dual-token session authentication.
//!
//! This crate implements a session protocol built on two JWTs signed with a
//! shared secret:
//!
//! - a short-lived, self-contained **access token** carried in the
//!   `Authorization: Bearer` header and checked without any store lookup
//! - a long-lived **refresh token** carried in an HttpOnly cookie, checked
//!   against a revocation registry and rotated on every use
//!
//! The [`session::SessionEngine`] makes the per-request decision; the
//! [`middleware::session_guard`] applies it at the axum boundary; the
//! [`http`] module provides the sign-up/sign-in/sign-out surface. Storage
//! is behind the [`storage::IdentityStore`] and [`storage::RevocationStore`]
//! traits, with in-memory implementations here and a Redis-backed registry
//! in `gatekit-auth-redis`.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gatekit_auth::config::AuthConfig;
//! use gatekit_auth::session::SessionEngine;
//! use gatekit_auth::storage::{MemoryIdentityStore, MemoryRevocationStore};
//!
//! let config = AuthConfig {
//!     secret: "change-me".to_string(),
//!     ..AuthConfig::default()
//! };
//! let engine = Arc::new(
//!     SessionEngine::new(
//!         config,
//!         Arc::new(MemoryIdentityStore::new()),
//!         Arc::new(MemoryRevocationStore::new()),
//!     )
//!     .expect("valid auth config"),
//! );
//!
//! let app: axum::Router = axum::Router::new()
//!     .nest("/auth", gatekit_auth::http::auth_router())
//!     .layer(axum::middleware::from_fn_with_state(
//!         engine.clone(),
//!         gatekit_auth::middleware::session_guard,
//!     ))
//!     .with_state(engine);
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod password;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError, CookieConfig};
pub use error::{AuthError, ErrorCategory};
pub use session::{SessionDecision, SessionEngine, SessionTokens};
pub use types::Principal;

/// Result type used throughout this crate.
pub type AuthResult<T> = Result<T, AuthError>;
