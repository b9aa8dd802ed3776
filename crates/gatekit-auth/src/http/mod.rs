//! The account surface: sign-up, sign-in, sign-out.
//!
//! These routes live under the guard-exempt prefix; a caller with no
//! session at all must still be able to reach them. Successful sign-up and
//! sign-in establish a session the same way: refresh token in an HttpOnly
//! cookie, access token in the JSON body.

pub mod signin;
pub mod signout;
pub mod signup;

mod validate;

use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use crate::error::AuthError;
use crate::session::SessionEngine;
use crate::types::Principal;

/// Builds the account router. Nest it under the configured exempt prefix.
pub fn auth_router() -> Router<Arc<SessionEngine>> {
    Router::new()
        .route("/signup", post(signup::signup))
        .route("/signin", post(signin::signin))
        .route("/signout", post(signout::signout))
}

/// Builds the response that establishes a session: `Set-Cookie` for the
/// refresh token, `{"accessToken": ...}` in the body.
fn session_response(
    engine: &SessionEngine,
    principal: &Principal,
    status: StatusCode,
) -> Result<Response, AuthError> {
    let tokens = engine.issue_session(principal)?;
    let cookie = engine
        .config()
        .cookie
        .build(&tokens.refresh_token, engine.config().refresh_token_lifetime);
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AuthError::internal(format!("failed to encode refresh cookie: {e}")))?;

    let mut response =
        (status, Json(json!({ "accessToken": tokens.access_token }))).into_response();
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::AuthConfig;
    use crate::storage::{MemoryIdentityStore, MemoryRevocationStore};

    pub(crate) fn test_engine() -> Arc<SessionEngine> {
        let engine = SessionEngine::new(
            AuthConfig {
                secret: "test-secret".to_string(),
                ..AuthConfig::default()
            },
            Arc::new(MemoryIdentityStore::new()),
            Arc::new(MemoryRevocationStore::new()),
        )
        .unwrap();
        Arc::new(engine)
    }

    pub(crate) fn test_router(engine: Arc<SessionEngine>) -> Router {
        auth_router().with_state(engine)
    }

    pub(crate) fn json_request(uri: &str, body: serde_json::Value) -> axum::extract::Request {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    }

    pub(crate) async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
