//! Session establishment and renewal.
//!
//! The [`engine::SessionEngine`] is the per-request decision maker: it
//! inspects the presented credential pair, decides accept/reject/rotate,
//! and hands the boundary layer an explicit [`engine::SessionDecision`] to
//! interpret. It holds no cross-request state of its own; the identity and
//! revocation stores are shared, injected collaborators.

pub mod engine;

pub use engine::{SessionDecision, SessionEngine, SessionTokens};
