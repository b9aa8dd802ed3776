//! The session decision engine.
//!
//! A four-branch state machine over the pair (access token present?,
//! refresh token present?):
//!
//! | Access  | Refresh | Decision |
//! |---------|---------|----------|
//! | absent  | absent  | reject `Unauthenticated` |
//! | absent  | present | refresh flow; rotate on success |
//! | present | absent  | reject `Unauthenticated` |
//! | present | present | accept on valid access token, else refresh flow |
//!
//! A lone access token is rejected even when it verifies: legitimate
//! clients always hold both tokens, so an unpaired access token is treated
//! as a leaked credential.
//!
//! The refresh flow checks the revocation registry before anything else and
//! fails closed: a registry error is a rejection, never an implicit grant.
//! A successful refresh retires the presented token (single-use refresh
//! tokens) and issues a fresh pair.

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::storage::{IdentityStore, RevocationStore};
use crate::token::TokenCodec;
use crate::types::Principal;
use crate::AuthResult;

// =============================================================================
// Decision Types
// =============================================================================

/// A freshly issued access + refresh token pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    /// Short-lived, self-contained access token.
    pub access_token: String,

    /// Long-lived refresh token, delivered as an HttpOnly cookie.
    pub refresh_token: String,
}

/// The engine's verdict for one request.
///
/// Returned to the boundary layer and interpreted there explicitly; the
/// engine itself never touches the HTTP response.
#[derive(Debug)]
pub enum SessionDecision {
    /// The request is authenticated.
    Accepted {
        /// The resolved identity for this request.
        principal: Principal,

        /// Rotated credentials, present only when the refresh flow ran.
        renewed: Option<SessionTokens>,
    },

    /// The request is rejected; downstream processing must halt.
    Rejected(AuthError),
}

impl SessionDecision {
    /// Returns `true` if the decision is an acceptance.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

// =============================================================================
// Session Engine
// =============================================================================

/// Per-request accept/reject/rotate decision maker.
///
/// Constructed once at startup with injected store handles and shared
/// across requests; all per-request state lives in the returned
/// [`SessionDecision`].
pub struct SessionEngine {
    codec: TokenCodec,
    identities: Arc<dyn IdentityStore>,
    revocations: Arc<dyn RevocationStore>,
    config: AuthConfig,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("codec", &self.codec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionEngine {
    /// Creates a new engine.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the config fails validation
    /// (notably a missing signing secret). Fatal at startup.
    pub fn new(
        config: AuthConfig,
        identities: Arc<dyn IdentityStore>,
        revocations: Arc<dyn RevocationStore>,
    ) -> AuthResult<Self> {
        config
            .validate()
            .map_err(|e| AuthError::configuration(e.to_string()))?;
        let codec = TokenCodec::new(&config.secret)?;

        Ok(Self {
            codec,
            identities,
            revocations,
            config,
        })
    }

    /// Returns the engine's configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Returns the shared identity store handle.
    #[must_use]
    pub fn identities(&self) -> &Arc<dyn IdentityStore> {
        &self.identities
    }

    /// Returns the shared revocation registry handle.
    #[must_use]
    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }

    /// Issues a fresh access + refresh pair for a verified principal.
    ///
    /// Pure token construction; mutating the response (cookie, body field)
    /// is the boundary layer's job. Never call this for an identity that
    /// has not been verified.
    ///
    /// # Errors
    ///
    /// Fails only if token encoding fails.
    pub fn issue_session(&self, principal: &Principal) -> AuthResult<SessionTokens> {
        let access_token = self
            .codec
            .issue_access(principal, self.config.access_token_lifetime)?;
        let refresh_token = self
            .codec
            .issue_refresh(&principal.id, self.config.refresh_token_lifetime)?;
        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Decides the fate of one request from its presented credentials.
    pub async fn authorize(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> SessionDecision {
        match (access_token, refresh_token) {
            (None, None) => SessionDecision::Rejected(AuthError::unauthenticated(
                "no credential presented",
            )),
            (Some(_), None) => {
                // A lone access token is never trusted, valid or not.
                SessionDecision::Rejected(AuthError::unauthenticated(
                    "access token presented without its refresh token",
                ))
            }
            (None, Some(refresh)) => match self.refresh_flow(refresh).await {
                Ok((principal, renewed)) => SessionDecision::Accepted {
                    principal,
                    renewed: Some(renewed),
                },
                Err(err) => SessionDecision::Rejected(err),
            },
            (Some(access), Some(refresh)) => {
                // Access token first: cheap, no store lookup.
                match self.codec.verify_access(access) {
                    Ok(claims) => SessionDecision::Accepted {
                        principal: claims.into(),
                        renewed: None,
                    },
                    Err(err) => {
                        tracing::debug!(error = %err, "access token rejected, trying refresh flow");
                        match self.refresh_flow(refresh).await {
                            Ok((principal, renewed)) => SessionDecision::Accepted {
                                principal,
                                renewed: Some(renewed),
                            },
                            Err(err) => SessionDecision::Rejected(err),
                        }
                    }
                }
            }
        }
    }

    /// The refresh-token flow: revocation check, signature/expiry check,
    /// identity re-hydration, rotation.
    ///
    /// The revocation check runs first so that a revoked token is rejected
    /// regardless of its signature validity.
    async fn refresh_flow(
        &self,
        refresh_token: &str,
    ) -> Result<(Principal, SessionTokens), AuthError> {
        let revoked = self
            .revocations
            .is_revoked(refresh_token)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "revocation registry unreachable, failing closed");
                AuthError::unavailable("revocation registry unreachable")
            })?;
        if revoked {
            tracing::debug!("refresh token is revoked");
            return Err(AuthError::session_expired("refresh token has been revoked"));
        }

        let claims = self.codec.verify_refresh(refresh_token).map_err(|err| {
            tracing::debug!(error = %err, "refresh token rejected");
            AuthError::session_expired("refresh token rejected")
        })?;

        let identity = self
            .identities
            .find_by_id(&claims.sub)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "identity lookup unreachable, failing closed");
                AuthError::unavailable("identity lookup unreachable")
            })?
            .ok_or_else(|| {
                tracing::debug!(subject = %claims.sub, "refresh token subject not found");
                AuthError::session_expired("unknown subject")
            })?;

        // Single-use refresh tokens: retire the presented token before its
        // replacement exists. If the write fails we reject rather than let
        // a token that should be dead stay usable.
        self.revocations
            .revoke(refresh_token, self.config.refresh_token_lifetime)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "failed to retire rotated refresh token, failing closed");
                AuthError::unavailable("revocation registry unreachable")
            })?;

        let principal = Principal::from(identity);
        let renewed = self.issue_session(&principal)?;
        tracing::debug!(subject = %principal.id, "session renewed via refresh token");
        Ok((principal, renewed))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Identity, MemoryIdentityStore, MemoryRevocationStore};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Registry double that errors on every call, simulating an outage.
    struct UnreachableRevocationStore;

    #[async_trait]
    impl RevocationStore for UnreachableRevocationStore {
        async fn revoke(&self, _token: &str, _ttl: Duration) -> AuthResult<()> {
            Err(AuthError::storage("connection refused"))
        }

        async fn is_revoked(&self, _token: &str) -> AuthResult<bool> {
            Err(AuthError::storage("connection refused"))
        }
    }

    fn test_config() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            ..AuthConfig::default()
        }
    }

    async fn engine_with_user() -> (SessionEngine, Principal) {
        let identities = Arc::new(MemoryIdentityStore::new());
        let identity = Identity::builder("kawsar ahmed", "kawsar@mail.com")
            .id("547")
            .build();
        identities.create(&identity).await.unwrap();

        let engine = SessionEngine::new(
            test_config(),
            identities,
            Arc::new(MemoryRevocationStore::new()),
        )
        .unwrap();
        (engine, Principal::from(identity))
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = SessionEngine::new(
            AuthConfig::default(),
            Arc::new(MemoryIdentityStore::new()),
            Arc::new(MemoryRevocationStore::new()),
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_no_credentials_rejected() {
        let (engine, _) = engine_with_user().await;
        let decision = engine.authorize(None, None).await;
        assert!(
            matches!(decision, SessionDecision::Rejected(AuthError::Unauthenticated { .. }))
        );
    }

    #[tokio::test]
    async fn test_lone_access_token_rejected_even_when_valid() {
        let (engine, principal) = engine_with_user().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let decision = engine.authorize(Some(&tokens.access_token), None).await;
        assert!(
            matches!(decision, SessionDecision::Rejected(AuthError::Unauthenticated { .. }))
        );
    }

    #[tokio::test]
    async fn test_valid_pair_accepted_without_rotation() {
        let (engine, principal) = engine_with_user().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let decision = engine
            .authorize(Some(&tokens.access_token), Some(&tokens.refresh_token))
            .await;
        match decision {
            SessionDecision::Accepted { principal: p, renewed } => {
                assert_eq!(p, principal);
                assert!(renewed.is_none());
            }
            SessionDecision::Rejected(err) => panic!("rejected: {err}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_token_alone_rotates() {
        let (engine, principal) = engine_with_user().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let decision = engine.authorize(None, Some(&tokens.refresh_token)).await;
        match decision {
            SessionDecision::Accepted { principal: p, renewed } => {
                assert_eq!(p, principal);
                let renewed = renewed.expect("refresh flow must rotate");
                assert!(!renewed.access_token.is_empty());
                assert_ne!(renewed.refresh_token, tokens.refresh_token);
            }
            SessionDecision::Rejected(err) => panic!("rejected: {err}"),
        }
    }

    #[tokio::test]
    async fn test_rotation_retires_presented_refresh_token() {
        let (engine, principal) = engine_with_user().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let first = engine.authorize(None, Some(&tokens.refresh_token)).await;
        assert!(first.is_accepted());
        assert!(
            engine
                .revocations()
                .is_revoked(&tokens.refresh_token)
                .await
                .unwrap()
        );

        // Replaying the rotated token is a rejection.
        let second = engine.authorize(None, Some(&tokens.refresh_token)).await;
        assert!(
            matches!(second, SessionDecision::Rejected(AuthError::SessionExpired { .. }))
        );
    }

    #[tokio::test]
    async fn test_valid_access_wins_over_invalid_refresh() {
        let (engine, principal) = engine_with_user().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let decision = engine
            .authorize(Some(&tokens.access_token), Some("garbage"))
            .await;
        match decision {
            SessionDecision::Accepted { renewed, .. } => assert!(renewed.is_none()),
            SessionDecision::Rejected(err) => panic!("rejected: {err}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_access_falls_through_to_refresh_flow() {
        let (engine, principal) = engine_with_user().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let decision = engine
            .authorize(Some("not-a-token"), Some(&tokens.refresh_token))
            .await;
        match decision {
            SessionDecision::Accepted { renewed, .. } => assert!(renewed.is_some()),
            SessionDecision::Rejected(err) => panic!("rejected: {err}"),
        }
    }

    #[tokio::test]
    async fn test_revoked_refresh_rejected_despite_valid_signature() {
        let (engine, principal) = engine_with_user().await;
        let tokens = engine.issue_session(&principal).unwrap();

        engine
            .revocations()
            .revoke(&tokens.refresh_token, Duration::from_secs(3600))
            .await
            .unwrap();

        let decision = engine.authorize(None, Some(&tokens.refresh_token)).await;
        assert!(
            matches!(decision, SessionDecision::Rejected(AuthError::SessionExpired { .. }))
        );
    }

    #[tokio::test]
    async fn test_malformed_refresh_rejected() {
        let (engine, _) = engine_with_user().await;
        let decision = engine.authorize(None, Some("garbage")).await;
        assert!(
            matches!(decision, SessionDecision::Rejected(AuthError::SessionExpired { .. }))
        );
    }

    #[tokio::test]
    async fn test_unknown_subject_rejected() {
        let engine = SessionEngine::new(
            test_config(),
            Arc::new(MemoryIdentityStore::new()),
            Arc::new(MemoryRevocationStore::new()),
        )
        .unwrap();

        let orphan = Principal {
            id: "999".to_string(),
            name: "Ghost".to_string(),
            email: "ghost@mail.com".to_string(),
            image: None,
        };
        let tokens = engine.issue_session(&orphan).unwrap();

        let decision = engine.authorize(None, Some(&tokens.refresh_token)).await;
        assert!(
            matches!(decision, SessionDecision::Rejected(AuthError::SessionExpired { .. }))
        );
    }

    #[tokio::test]
    async fn test_registry_outage_fails_closed() {
        let identities = Arc::new(MemoryIdentityStore::new());
        let identity = Identity::builder("A", "a@mail.com").id("1").build();
        identities.create(&identity).await.unwrap();

        let engine = SessionEngine::new(
            test_config(),
            identities,
            Arc::new(UnreachableRevocationStore),
        )
        .unwrap();
        let tokens = engine.issue_session(&Principal::from(identity)).unwrap();

        // The refresh token is perfectly valid; the outage still rejects.
        let decision = engine.authorize(None, Some(&tokens.refresh_token)).await;
        assert!(
            matches!(decision, SessionDecision::Rejected(AuthError::Unavailable { .. }))
        );
    }
}
