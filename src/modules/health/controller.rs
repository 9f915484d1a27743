use anyhow::anyhow;
use axum::{extract::Request, http::StatusCode};
use serde::Serialize;
use tracing::error;
use userhub_core::AppError;

use crate::modules::users::UserStore;
use crate::web::{Context, HandlerResult, respond};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'static str>,
}

/// Reports that the process is up. Never touches dependencies.
pub async fn liveness(_ctx: Context, _req: Request) -> HandlerResult {
    respond(
        StatusCode::OK,
        &HealthStatus {
            status: "up",
            version: Some(env!("CARGO_PKG_VERSION")),
        },
    )
}

/// Reports whether the user store answers.
pub async fn readiness(store: UserStore, ctx: Context, _req: Request) -> HandlerResult {
    if let Err(err) = store.ping(&ctx).await {
        error!(error = %err, "readiness check failed");
        return Err(AppError::internal(anyhow!("store not ready: {}", err)));
    }

    respond(
        StatusCode::OK,
        &HealthStatus {
            status: "ok",
            version: None,
        },
    )
}
