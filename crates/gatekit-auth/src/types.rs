//! Core session types.

use serde::{Deserialize, Serialize};

use crate::storage::Identity;

/// The resolved, authenticated identity for the current request.
///
/// A `Principal` is produced either by verifying a self-contained access
/// token or by re-hydrating an identity during the refresh-token flow. It
/// lives only for the duration of one request (as an axum request
/// extension) and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable subject identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Email address.
    pub email: String,

    /// Profile image reference, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<Identity> for Principal {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            image: identity.image,
        }
    }
}
