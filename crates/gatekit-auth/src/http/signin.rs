//! Password sign-in.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;

use crate::error::AuthError;
use crate::password::verify_password;
use crate::session::SessionEngine;
use crate::storage::IdentityStore;
use crate::types::Principal;

use super::{session_response, validate};

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/signin`
///
/// An unknown email is a 404; a known account with the wrong password, or
/// one that has no password at all (externally provisioned), is a 401.
pub async fn signin(
    State(engine): State<Arc<SessionEngine>>,
    Json(body): Json<SignInRequest>,
) -> Result<Response, AuthError> {
    validate::validate_email(&body.email)?;
    validate::validate_password(&body.password)?;

    let identity = engine
        .identities()
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| AuthError::unknown_email(&body.email))?;

    let Some(hash) = &identity.password_hash else {
        // Password presented against a passwordless account.
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password(&body.password, hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    tracing::info!(subject = %identity.id, "signed in");
    session_response(&engine, &Principal::from(identity), StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use crate::http::test_support::{json_body, json_request, test_engine, test_router};
    use crate::password::hash_password;
    use crate::storage::{Identity, IdentityStore};
    use axum::http::{StatusCode, header};
    use serde_json::json;
    use tower::ServiceExt;

    async fn engine_with_account() -> std::sync::Arc<crate::session::SessionEngine> {
        let engine = test_engine();
        let identity = Identity::builder("kawsar ahmed", "kawsar@mail.com")
            .password_hash(hash_password("123456").unwrap())
            .build();
        engine.identities().create(&identity).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_signin_with_valid_credentials() {
        let engine = engine_with_account().await;
        let response = test_router(engine)
            .oneshot(json_request(
                "/signin",
                json!({"email": "kawsar@mail.com", "password": "123456"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("sign-in must set the refresh cookie")
            .to_string();
        assert!(cookie.starts_with("refresh_token="));

        let body = json_body(response).await;
        assert!(body["accessToken"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_signin_unknown_email_is_404() {
        let engine = engine_with_account().await;
        let response = test_router(engine)
            .oneshot(json_request(
                "/signin",
                json!({"email": "nobody@mail.com", "password": "123456"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signin_wrong_password_is_401() {
        let engine = engine_with_account().await;
        let response = test_router(engine)
            .oneshot(json_request(
                "/signin",
                json!({"email": "kawsar@mail.com", "password": "654321"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_signin_against_passwordless_account_is_401() {
        let engine = test_engine();
        engine
            .identities()
            .create(&Identity::new("External User", "ext@mail.com"))
            .await
            .unwrap();

        let response = test_router(engine)
            .oneshot(json_request(
                "/signin",
                json!({"email": "ext@mail.com", "password": "123456"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
