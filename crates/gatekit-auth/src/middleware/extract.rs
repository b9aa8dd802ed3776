//! Handler-side extractor for the authenticated principal.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AuthError;
use crate::types::Principal;

/// Extracts the [`Principal`] placed in request extensions by
/// [`super::session_guard`].
///
/// Rejects with 401 if no principal is present, which means the route was
/// wired outside the guard. Protected handlers take this as an argument
/// instead of reaching into extensions by hand.
#[derive(Debug, Clone)]
pub struct SessionPrincipal(pub Principal);

impl<S> FromRequestParts<S> for SessionPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Self)
            .ok_or_else(|| {
                AuthError::unauthenticated("request reached a protected handler without a session")
            })
    }
}
