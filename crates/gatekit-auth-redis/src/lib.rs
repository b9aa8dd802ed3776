//! Redis-backed revocation registry.
//!
//! Each revoked refresh token becomes a key `revoked-token#<token>` with a
//! TTL equal to the remaining refresh-token lifetime, so the registry never
//! outgrows the set of tokens that could still be presented. Redis expires
//! the keys on its own; no cleanup job is needed.
//!
//! Redis is the production backend because the registry needs
//! read-after-write consistency across every server process: a token
//! revoked by one instance must be visibly revoked to all of them on the
//! next request.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use gatekit_auth::storage::RevocationStore;
use gatekit_auth::{AuthError, AuthResult};

const KEY_PREFIX: &str = "revoked-token#";

/// [`RevocationStore`] backed by Redis.
///
/// Holds a [`ConnectionManager`], which multiplexes over one connection and
/// reconnects on failure; cloning is cheap and the store is shared freely.
#[derive(Clone)]
pub struct RedisRevocationStore {
    conn: ConnectionManager,
}

impl RedisRevocationStore {
    /// Connects to Redis at the given URL.
    ///
    /// # Errors
    ///
    /// Returns a `Storage` error if the URL is invalid or the initial
    /// connection fails. Fatal at startup.
    pub async fn connect(url: &str) -> AuthResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AuthError::storage(format!("invalid redis url: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AuthError::storage(format!("redis connection failed: {e}")))?;
        tracing::info!("connected to redis revocation registry");
        Ok(Self { conn })
    }

    /// Wraps an existing connection manager.
    #[must_use]
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(token: &str) -> String {
        format!("{KEY_PREFIX}{token}")
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token: &str, ttl: Duration) -> AuthResult<()> {
        // SETEX rejects a zero expiry; clamp so the key still appears for
        // the final moments of a nearly-expired token.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(Self::key(token), true, seconds)
            .await
            .map_err(|e| AuthError::storage(format!("redis SETEX failed: {e}")))?;
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        let mut conn = self.conn.clone();
        conn.exists(Self::key(token))
            .await
            .map_err(|e| AuthError::storage(format!("redis EXISTS failed: {e}")))
    }
}
