//! Identity lookup trait.
//!
//! Defines the interface the refresh-token flow and the sign-up/sign-in
//! handlers use to resolve accounts. Implementations own persistence; this
//! crate only defines the contract they satisfy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;

// =============================================================================
// Identity Type
// =============================================================================

/// A stored account in the authentication system.
///
/// This is the row shape the identity store traffics in. The request-scoped
/// view of it is [`crate::types::Principal`], which never carries the
/// password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier for the account.
    #[serde(default)]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Email address, unique across accounts.
    pub email: String,

    /// Argon2id-hashed password in PHC string format.
    ///
    /// `None` for accounts provisioned by an external identity provider.
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Profile image reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Identity {
    /// Creates a new identity with a generated id.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash: None,
            image: None,
        }
    }

    /// Creates a new identity builder.
    #[must_use]
    pub fn builder(name: impl Into<String>, email: impl Into<String>) -> IdentityBuilder {
        IdentityBuilder::new(name, email)
    }

    /// Returns `true` if this account authenticates with a password.
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Builder for [`Identity`] instances.
pub struct IdentityBuilder {
    identity: Identity,
}

impl IdentityBuilder {
    fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            identity: Identity::new(name, email),
        }
    }

    /// Sets the account id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.identity.id = id.into();
        self
    }

    /// Sets the password hash.
    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.identity.password_hash = Some(hash.into());
        self
    }

    /// Sets the profile image reference.
    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.identity.image = Some(image.into());
        self
    }

    /// Builds the identity.
    #[must_use]
    pub fn build(self) -> Identity {
        self.identity
    }
}

// =============================================================================
// Identity Store Trait
// =============================================================================

/// Lookup and creation operations for identities.
///
/// `find_by_id` is the only operation the decision engine itself needs; the
/// remaining operations serve the sign-up/sign-in handlers.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Finds an identity by its stable id.
    ///
    /// Returns `None` if no such account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<Identity>>;

    /// Finds an identity by email address.
    ///
    /// Returns `None` if no such account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Identity>>;

    /// Creates a new identity.
    ///
    /// # Errors
    ///
    /// Returns `EmailTaken` if an account with the same email already
    /// exists, or an error if the storage operation fails.
    async fn create(&self, identity: &Identity) -> AuthResult<()>;
}
