//! Account creation.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;

use crate::error::AuthError;
use crate::password::hash_password;
use crate::session::SessionEngine;
use crate::storage::{Identity, IdentityStore};
use crate::types::Principal;

use super::{session_response, validate};

/// Sign-up request body.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `POST /auth/signup`
///
/// Creates an account and establishes a session in one step: 201 with an
/// access token in the body and the refresh token as an HttpOnly cookie.
/// A duplicate email is a 409.
pub async fn signup(
    State(engine): State<Arc<SessionEngine>>,
    Json(body): Json<SignUpRequest>,
) -> Result<Response, AuthError> {
    validate::validate_name(&body.name)?;
    validate::validate_email(&body.email)?;
    validate::validate_password(&body.password)?;

    let identity = Identity::builder(body.name.trim(), &body.email)
        .password_hash(hash_password(&body.password)?)
        .build();

    // The store enforces email uniqueness; EmailTaken surfaces as 409.
    engine.identities().create(&identity).await?;
    tracing::info!(subject = %identity.id, "account created");

    session_response(&engine, &Principal::from(identity), StatusCode::CREATED)
}
