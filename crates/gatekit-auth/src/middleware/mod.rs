//! HTTP boundary for the session engine.
//!
//! - [`session::session_guard`]: the axum middleware that extracts the
//!   credential pair, asks the [`crate::session::SessionEngine`] for a
//!   decision, and applies it to the request/response.
//! - [`extract::SessionPrincipal`]: handler-side extractor for the
//!   authenticated principal.
//! - [`error`]: maps [`crate::error::AuthError`] onto HTTP responses.

pub mod error;
pub mod extract;
pub mod session;

pub use extract::SessionPrincipal;
pub use session::session_guard;
