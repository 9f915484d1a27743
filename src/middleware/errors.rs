use std::sync::Arc;

use axum::{extract::Request, response::IntoResponse};
use futures::FutureExt;
use tracing::{error, warn};
use userhub_core::AppError;

use crate::web::{Context, Handler, Middleware, middleware};

pub const MISSING_VALUES: &str = "web value missing from context";

/// Turns every error from the inner chain into a response, classified once by
/// [`AppError::cause`]. A request without [`Values`](crate::web::Values) never
/// reaches the inner chain. Shutdown errors are logged and passed on so the app
/// can respond and then stop taking traffic.
pub fn errors() -> Middleware {
    middleware(|next: Handler| -> Handler {
        Arc::new(move |ctx: Context, req: Request| {
            let next = next.clone();
            async move {
                let Some(values) = ctx.values().cloned() else {
                    return Err(AppError::shutdown(MISSING_VALUES));
                };

                let err = match next(ctx, req).await {
                    Ok(response) => return Ok(response),
                    Err(err) => err,
                };

                let err = err.cause();
                if err.status().is_server_error() {
                    error!(trace_id = %values.trace_id, error = %err, "request failed");
                } else {
                    warn!(trace_id = %values.trace_id, error = %err, "request rejected");
                }

                if err.is_shutdown() {
                    return Err(err);
                }

                Ok(err.into_response())
            }
            .boxed()
        })
    })
}
