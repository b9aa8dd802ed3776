//! The session guard middleware.
//!
//! Runs ahead of every protected route. It pulls the access token from the
//! `Authorization: Bearer` header and the refresh token from the configured
//! cookie, asks the [`SessionEngine`] for a decision, and applies it:
//!
//! - `Rejected`: the error becomes the response; the handler never runs.
//! - `Accepted` without renewal: the [`Principal`] is inserted as a request
//!   extension and the handler runs untouched.
//! - `Accepted` with renewal: additionally, the rotated refresh token is
//!   attached as a `Set-Cookie` header and the new access token is merged
//!   into the JSON response body under `accessToken`, so a client that
//!   arrived with only a refresh token leaves with a full pair.
//!
//! Requests under the configured exempt prefix (the sign-up/sign-in
//! surface) bypass the guard entirely.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use cookie::Cookie;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::session::{SessionDecision, SessionEngine, SessionTokens};

/// The axum middleware entry point; wire with
/// `axum::middleware::from_fn_with_state(engine, session_guard)`.
pub async fn session_guard(
    State(engine): State<Arc<SessionEngine>>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_exempt(request.uri().path(), &engine.config().exempt_prefix) {
        return next.run(request).await;
    }

    let access = bearer_token(request.headers());
    let refresh = cookie_value(request.headers(), &engine.config().cookie.name);

    match engine.authorize(access.as_deref(), refresh.as_deref()).await {
        SessionDecision::Rejected(err) => err.into_response(),
        SessionDecision::Accepted { principal, renewed } => {
            request.extensions_mut().insert(principal);
            let response = next.run(request).await;
            match renewed {
                None => response,
                Some(tokens) => attach_renewal(response, engine.config(), &tokens).await,
            }
        }
    }
}

/// A path is exempt when it equals the prefix or sits below it.
/// `/auth/signin` is exempt under `/auth`; `/authz` is not.
fn is_exempt(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Extracts a cookie value by name from the `Cookie` header(s).
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Applies a rotation to the outgoing response: sets the refresh cookie and
/// merges `accessToken` into the JSON body.
async fn attach_renewal(
    response: Response,
    config: &AuthConfig,
    tokens: &SessionTokens,
) -> Response {
    let (mut parts, body) = response.into_parts();

    let cookie = config
        .cookie
        .build(&tokens.refresh_token, config.refresh_token_lifetime);
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            parts.headers.append(header::SET_COOKIE, value);
        }
        Err(err) => {
            tracing::error!(error = %err, "refresh cookie is not a valid header value");
            return AuthError::internal("failed to encode refresh cookie").into_response();
        }
    }

    // Bodiless statuses keep the cookie but skip the merge; the client
    // still holds a valid rotated pair via the cookie alone on its next
    // refresh.
    if parts.status == StatusCode::NO_CONTENT || parts.status == StatusCode::NOT_MODIFIED {
        return Response::from_parts(parts, body);
    }

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, "failed to buffer response body for token merge");
            return AuthError::internal("failed to buffer response body").into_response();
        }
    };

    match merge_access_token(&bytes, &tokens.access_token) {
        Some(merged) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            Response::from_parts(parts, Body::from(merged))
        }
        // Non-object bodies pass through unchanged.
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}

/// Inserts `accessToken` into a JSON object body, leaving an existing field
/// (a handler that already issued tokens) alone. An empty body becomes
/// `{"accessToken": ...}`.
fn merge_access_token(body: &[u8], access_token: &str) -> Option<Vec<u8>> {
    let mut value: serde_json::Value = if body.is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_slice(body).ok()?
    };

    value
        .as_object_mut()?
        .entry("accessToken")
        .or_insert_with(|| access_token.into());
    serde_json::to_vec(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::SessionPrincipal;
    use crate::storage::{Identity, IdentityStore, MemoryIdentityStore, MemoryRevocationStore};
    use crate::types::Principal;
    use axum::routing::get;
    use axum::{Json, Router, middleware};
    use tower::ServiceExt;

    async fn test_engine() -> (Arc<SessionEngine>, Principal) {
        let identities = Arc::new(MemoryIdentityStore::new());
        let identity = Identity::builder("kawsar ahmed", "kawsar@mail.com")
            .id("547")
            .build();
        identities.create(&identity).await.unwrap();

        let engine = SessionEngine::new(
            AuthConfig {
                secret: "test-secret".to_string(),
                ..AuthConfig::default()
            },
            identities,
            Arc::new(MemoryRevocationStore::new()),
        )
        .unwrap();
        (Arc::new(engine), Principal::from(identity))
    }

    fn test_router(engine: Arc<SessionEngine>) -> Router {
        Router::new()
            .route(
                "/me",
                get(|SessionPrincipal(principal): SessionPrincipal| async move {
                    Json(principal)
                }),
            )
            .route("/auth/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn_with_state(engine, session_guard))
    }

    fn request(access: Option<&str>, refresh: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/me");
        if let Some(access) = access {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {access}"));
        }
        if let Some(refresh) = refresh {
            builder = builder.header(header::COOKIE, format!("refresh_token={refresh}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_exempt_prefix_bypasses_guard() {
        let (engine, _) = test_engine().await;
        let response = test_router(engine)
            .oneshot(
                Request::builder()
                    .uri("/auth/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_no_credentials_rejected() {
        let (engine, _) = test_engine().await;
        let response = test_router(engine)
            .oneshot(request(None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_pair_reaches_handler_without_rotation() {
        let (engine, principal) = test_engine().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let response = test_router(engine)
            .oneshot(request(
                Some(&tokens.access_token),
                Some(&tokens.refresh_token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let body = json_body(response).await;
        assert_eq!(body["email"], "kawsar@mail.com");
        assert!(body.get("accessToken").is_none());
    }

    #[tokio::test]
    async fn test_refresh_only_rotates_and_merges_access_token() {
        let (engine, principal) = test_engine().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let response = test_router(engine)
            .oneshot(request(None, Some(&tokens.refresh_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("rotation must set a refresh cookie")
            .to_string();
        assert!(set_cookie.starts_with("refresh_token="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(!set_cookie.contains(&tokens.refresh_token));

        let body = json_body(response).await;
        assert_eq!(body["email"], "kawsar@mail.com");
        let merged = body["accessToken"].as_str().expect("merged access token");
        assert!(!merged.is_empty());
    }

    #[tokio::test]
    async fn test_lone_access_token_rejected() {
        let (engine, principal) = test_engine().await;
        let tokens = engine.issue_session(&principal).unwrap();

        let response = test_router(engine)
            .oneshot(request(Some(&tokens.access_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_is_exempt_matches_prefix_boundaries() {
        assert!(is_exempt("/auth", "/auth"));
        assert!(is_exempt("/auth/signin", "/auth"));
        assert!(!is_exempt("/authz", "/auth"));
        assert!(!is_exempt("/me", "/auth"));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; refresh_token=tok-123; lang=en".parse().unwrap(),
        );
        assert_eq!(
            cookie_value(&headers, "refresh_token").as_deref(),
            Some("tok-123")
        );
        assert_eq!(cookie_value(&headers, "session"), None);
    }

    #[test]
    fn test_merge_access_token_into_object() {
        let merged = merge_access_token(br#"{"email":"a@mail.com"}"#, "new-token").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&merged).unwrap();
        assert_eq!(value["email"], "a@mail.com");
        assert_eq!(value["accessToken"], "new-token");
    }

    #[test]
    fn test_merge_access_token_keeps_existing_field() {
        let merged = merge_access_token(br#"{"accessToken":"handler-issued"}"#, "new-token").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&merged).unwrap();
        assert_eq!(value["accessToken"], "handler-issued");
    }

    #[test]
    fn test_merge_access_token_skips_non_objects() {
        assert!(merge_access_token(b"[1,2,3]", "new-token").is_none());
        assert!(merge_access_token(b"plain text", "new-token").is_none());
    }

    #[test]
    fn test_merge_access_token_fills_empty_body() {
        let merged = merge_access_token(b"", "new-token").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&merged).unwrap();
        assert_eq!(value["accessToken"], "new-token");
    }
}
