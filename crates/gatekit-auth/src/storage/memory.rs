//! In-memory storage implementations.
//!
//! Used by tests and single-process development setups. Both stores are
//! plain `RwLock`-guarded maps; nothing here survives a restart.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::AuthError;
use crate::AuthResult;

use super::identity::{Identity, IdentityStore};
use super::revocation::RevocationStore;

// =============================================================================
// Memory Identity Store
// =============================================================================

/// In-memory [`IdentityStore`] keyed by account id.
#[derive(Default)]
pub struct MemoryIdentityStore {
    accounts: RwLock<HashMap<String, Identity>>,
}

impl MemoryIdentityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<Identity>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| AuthError::storage("identity store lock poisoned"))?;
        Ok(accounts.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Identity>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| AuthError::storage("identity store lock poisoned"))?;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn create(&self, identity: &Identity) -> AuthResult<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| AuthError::storage("identity store lock poisoned"))?;
        if accounts.values().any(|a| a.email == identity.email) {
            return Err(AuthError::email_taken(identity.email.clone()));
        }
        accounts.insert(identity.id.clone(), identity.clone());
        Ok(())
    }
}

// =============================================================================
// Memory Revocation Store
// =============================================================================

/// In-memory [`RevocationStore`].
///
/// Records the moment each revocation lapses; a record past that moment is
/// equivalent to an absent one, matching the TTL behavior of the Redis
/// registry.
#[derive(Default)]
pub struct MemoryRevocationStore {
    revoked: RwLock<HashMap<String, OffsetDateTime>>,
}

impl MemoryRevocationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token: &str, ttl: Duration) -> AuthResult<()> {
        let expires_at = OffsetDateTime::now_utc() + ttl;
        let mut revoked = self
            .revoked
            .write()
            .map_err(|_| AuthError::storage("revocation store lock poisoned"))?;
        revoked.insert(token.to_string(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        let revoked = self
            .revoked
            .read()
            .map_err(|_| AuthError::storage("revocation store lock poisoned"))?;
        Ok(revoked
            .get(token)
            .is_some_and(|expires_at| *expires_at > OffsetDateTime::now_utc()))
    }
}

// =============================================================================
// Tests
// =============================================================================
