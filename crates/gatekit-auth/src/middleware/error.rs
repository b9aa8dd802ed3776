//! HTTP mapping for [`AuthError`].
//!
//! Every session rejection surfaces as 401 regardless of its internal
//! cause: a caller probing the boundary learns "sign in again" and nothing
//! about which check failed. Server-side errors are logged with their full
//! message and surface with a sanitized body.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::AuthError;

impl AuthError {
    /// The machine-readable code carried in the response body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::SessionExpired { .. } => "session_expired",
            Self::Unavailable { .. } => "unavailable",
            Self::Malformed { .. } => "malformed_credential",
            Self::EmailTaken { .. } => "email_taken",
            Self::UnknownEmail { .. } => "unknown_email",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Storage { .. } => "storage_error",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated { .. }
            | Self::SessionExpired { .. }
            | Self::Unavailable { .. }
            | Self::Malformed { .. }
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::EmailTaken { .. } => StatusCode::CONFLICT,
            Self::UnknownEmail { .. } => StatusCode::NOT_FOUND,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if self.is_server_error() {
            tracing::error!(error = %self, category = %self.category(), "request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, category = %self.category(), "request rejected");
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
