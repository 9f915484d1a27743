use std::sync::Arc;

use anyhow::Context as _;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use userhub::logging::init_tracing;
use userhub::metrics::init_metrics;
use userhub::router::init_router;
use userhub::state::AppState;
use userhub::web::Shutdown;
use userhub_auth::{Authenticator, KeyStore};
use userhub_config::{AuthConfig, DatabaseConfig, WebConfig};
use userhub_db::{PgUserRepository, init_db_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _guard = init_tracing();

    if let Err(err) = run().await {
        error!(error = %format!("{:#}", err), "startup failed");
        return Err(err);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting service");

    let web_config = WebConfig::from_env().context("loading web config")?;
    let auth_config = AuthConfig::from_env().context("loading auth config")?;
    let db_config = DatabaseConfig::from_env().context("loading database config")?;

    let keys = KeyStore::from_dir(&auth_config.keys_folder)
        .with_context(|| format!("loading keys from {}", auth_config.keys_folder.display()))?;
    info!(kids = ?keys.kids(), active_kid = %auth_config.active_kid, "key store loaded");
    let authenticator = Arc::new(
        Authenticator::new(Arc::new(keys), &auth_config).context("constructing authenticator")?,
    );

    let pool = init_db_pool(&db_config)
        .await
        .context("connecting to database")?;
    let repo = Arc::new(PgUserRepository::new(pool));

    let shutdown = Shutdown::new();
    let mut state = AppState::new(repo, authenticator, web_config.clone(), shutdown.clone());
    match init_metrics() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(err) => warn!(error = %format!("{:#}", err), "metrics disabled"),
    }

    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&web_config.api_host)
        .await
        .with_context(|| format!("binding {}", web_config.api_host))?;
    info!(host = %web_config.api_host, "API listening");

    let graceful = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { graceful.wait().await })
            .await
    });

    tokio::select! {
        result = &mut server => {
            return result.context("server task panicked")?.context("server error");
        }
        _ = shutdown_signal() => info!("shutdown signal received"),
        _ = shutdown.wait() => warn!("integrity failure, shutting down"),
    }

    shutdown.signal();
    match tokio::time::timeout(web_config.shutdown_timeout, &mut server).await {
        Ok(result) => {
            result.context("server task panicked")?.context("server error")?;
            info!("shutdown complete");
        }
        Err(_) => {
            server.abort();
            anyhow::bail!(
                "graceful shutdown did not complete within {:?}",
                web_config.shutdown_timeout
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
