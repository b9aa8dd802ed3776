//! Sign-out.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::AuthError;
use crate::middleware::session::cookie_value;
use crate::session::SessionEngine;
use crate::storage::RevocationStore;

/// `POST /auth/signout`
///
/// Revokes the presented refresh token and tells the browser to drop the
/// cookie. Idempotent: a request with no cookie, or with an
/// already-revoked token, still gets a 204 and the removal cookie.
pub async fn signout(
    State(engine): State<Arc<SessionEngine>>,
    headers: HeaderMap,
) -> Result<Response, AuthError> {
    if let Some(token) = cookie_value(&headers, &engine.config().cookie.name) {
        engine
            .revocations()
            .revoke(&token, engine.config().refresh_token_lifetime)
            .await?;
        tracing::info!("refresh token revoked on sign-out");
    }

    let removal = engine.config().cookie.removal();
    let value = HeaderValue::from_str(&removal.to_string())
        .map_err(|e| AuthError::internal(format!("failed to encode removal cookie: {e}")))?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}
