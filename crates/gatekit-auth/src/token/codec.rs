//! JWT codec for access and refresh tokens.
//!
//! The codec is a pure function of its input, the process-wide secret, and
//! the wall clock: it holds no mutable state and can be shared freely across
//! tasks. Verification failures are typed so callers can treat all of them
//! as a rejection while keeping them distinguishable for observability.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

use crate::error::AuthError;
use crate::types::Principal;
use crate::AuthResult;

// ============================================================================
// Verification Errors
// ============================================================================

/// Errors that can occur while verifying a token.
///
/// Callers reject on any of these; the distinction exists for logging, never
/// for granting access. The raw token value is never part of the error.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The token or its payload is structurally invalid.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the structural problem.
        message: String,
    },

    /// The signature does not match the process secret.
    #[error("Signature mismatch")]
    SignatureMismatch,

    /// The token is past its expiry timestamp.
    #[error("Token expired")]
    Expired,
}

impl VerifyError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::SignatureMismatch,
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Access token claims.
///
/// Self-contained: accepting an access token requires no store lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id).
    pub sub: String,

    /// Display name.
    pub name: String,

    /// Email address.
    pub email: String,

    /// Profile image reference, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl From<AccessClaims> for Principal {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            image: claims.image,
        }
    }
}

/// Refresh token claims. Subject id only; everything else is re-hydrated
/// from the identity store when the token is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user id).
    pub sub: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

// ============================================================================
// Token Codec
// ============================================================================

/// Signs and verifies session tokens with a shared HS256 secret.
#[derive(Debug)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Creates a codec from the process-wide signing secret.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for an empty secret. This is a fatal
    /// startup condition, never a per-request error.
    pub fn new(secret: &str) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::configuration("signing secret is empty"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Issues an access token for a verified principal.
    ///
    /// # Errors
    ///
    /// Fails only if JWT encoding itself fails.
    pub fn issue_access(&self, principal: &Principal, lifetime: Duration) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = AccessClaims {
            sub: principal.id.clone(),
            name: principal.name.clone(),
            email: principal.email.clone(),
            image: principal.image.clone(),
            iat: now,
            exp: now + lifetime.as_secs() as i64,
        };
        self.sign(&claims)
    }

    /// Issues a refresh token for a subject id.
    ///
    /// # Errors
    ///
    /// Fails only if JWT encoding itself fails.
    pub fn issue_refresh(&self, subject: &str, lifetime: Duration) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = RefreshClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + lifetime.as_secs() as i64,
        };
        self.sign(&claims)
    }

    /// Verifies an access token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns the [`VerifyError`] taxonomy; all variants are rejections.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, VerifyError> {
        self.verify(token)
    }

    /// Verifies a refresh token's signature and expiry.
    ///
    /// Note that a refresh token's revocation status is a separate concern
    /// checked against the revocation registry by the caller.
    ///
    /// # Errors
    ///
    /// Returns the [`VerifyError`] taxonomy; all variants are rejections.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, VerifyError> {
        self.verify(token)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("failed to encode token: {e}")))
    }

    fn verify<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, VerifyError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(VerifyError::from)
    }
}

// ============================================================================
// Tests
// ============================================================================
