use std::sync::Arc;

use gatekit_auth::session::SessionEngine;
use gatekit_auth::storage::{MemoryIdentityStore, MemoryRevocationStore, RevocationStore};
use gatekit_auth_redis::RedisRevocationStore;
use gatekit_server::config::{AppConfig, loader::load_config};
use gatekit_server::{build_router, observability};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else) so local development
    // can configure through it.
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let config_path = std::env::var("GATEKIT_CONFIG").ok();
    let cfg = match load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    observability::init_tracing(&cfg.logging.level);

    if let Err(e) = run(cfg).await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let revocations: Arc<dyn RevocationStore> = match &cfg.redis.url {
        Some(url) => Arc::new(RedisRevocationStore::connect(url).await?),
        None => {
            tracing::warn!(
                "redis.url not configured, using the in-process revocation registry; \
                 revocations will not be shared across instances or restarts"
            );
            Arc::new(MemoryRevocationStore::new())
        }
    };
    let identities = Arc::new(MemoryIdentityStore::new());

    let engine = Arc::new(SessionEngine::new(cfg.auth.clone(), identities, revocations)?);
    let app = build_router(&cfg, engine)?;

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "gatekit server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received ctrl-c"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
