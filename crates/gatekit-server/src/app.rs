//! Router assembly.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use axum::response::Json;
use axum::routing::get;
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use gatekit_auth::http::auth_router;
use gatekit_auth::middleware::{SessionPrincipal, session_guard};
use gatekit_auth::session::SessionEngine;
use gatekit_auth::types::Principal;

use crate::config::{AppConfig, CorsConfig};

/// Builds the application router.
///
/// Everything except `/health` and the auth prefix sits behind the session
/// guard. `/health` is wired after the guard layer so load balancers can
/// probe without credentials.
pub fn build_router(cfg: &AppConfig, engine: Arc<SessionEngine>) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/me", get(me))
        .nest(&cfg.auth.exempt_prefix, auth_router())
        .layer(middleware::from_fn_with_state(
            engine.clone(),
            session_guard,
        ))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&cfg.cors)?)
        .with_state(engine);

    Ok(router)
}

/// `GET /me` — the authenticated caller's own profile.
async fn me(SessionPrincipal(principal): SessionPrincipal) -> Json<Principal> {
    Json(principal)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(cfg: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let layer = match &cfg.origin {
        Some(origin) => {
            // Cookies only flow cross-origin with an exact allowed origin
            // and credentials enabled; wildcards are rejected by browsers.
            let origin: HeaderValue = origin
                .parse()
                .with_context(|| format!("invalid cors.origin: {origin}"))?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        }
        None => CorsLayer::permissive(),
    };
    Ok(layer)
}
