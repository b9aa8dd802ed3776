//! Revocation registry trait.
//!
//! Records which refresh tokens have been explicitly invalidated before
//! their natural expiry. Records carry a TTL equal to the refresh-token
//! lifetime: once the underlying token would have expired anyway, the
//! record is useless and may lapse, which bounds registry growth.
//!
//! # Security Considerations
//!
//! - Absence of a key means "not revoked"; presence means revoked.
//! - A registry error must be treated by callers as revoked (fail closed).
//!   Granting access because a security check could not be performed is
//!   strictly worse than rejecting a legitimate caller once.
//! - A `revoke` must be visible to subsequent `is_revoked` calls from any
//!   concurrent request (read-after-write consistency).

use async_trait::async_trait;
use std::time::Duration;

use crate::AuthResult;

/// Storage trait for the refresh-token revocation registry.
///
/// # Implementations
///
/// - [`crate::storage::MemoryRevocationStore`] for tests and development
/// - `gatekit-auth-redis::RedisRevocationStore` for production
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks a refresh token unusable for the remainder of its lifetime.
    ///
    /// # Idempotency
    ///
    /// Revoking an already-revoked token succeeds without error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(&self, token: &str, ttl: Duration) -> AuthResult<()>;

    /// Checks whether a refresh token has been revoked.
    ///
    /// Called on every use of a refresh token, so implementations should be
    /// a single fast key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails; callers must then
    /// reject the request rather than assume "not revoked."
    async fn is_revoked(&self, token: &str) -> AuthResult<bool>;
}
