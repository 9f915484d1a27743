use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::Request;
use futures::FutureExt;
use metrics::counter;
use tracing::error;
use userhub_core::AppError;

use crate::web::{Context, Handler, Middleware, middleware};

/// Recovers from a panic in any inner step and reports it as an
/// unclassified error, so one bad request cannot take its task down.
pub fn panics() -> Middleware {
    middleware(|next: Handler| -> Handler {
        Arc::new(move |ctx: Context, req: Request| {
            let next = next.clone();
            // The call itself is inside the guarded future so a handler that
            // panics before returning its future is caught too.
            AssertUnwindSafe(async move { next(ctx, req).await })
                .catch_unwind()
                .map(|outcome| match outcome {
                    Ok(result) => result,
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        counter!("http_panics_total").increment(1);
                        error!(panic = %message, "recovered from panic");
                        Err(AppError::Unclassified(anyhow!("PANIC [{}]", message)))
                    }
                })
                .boxed()
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
