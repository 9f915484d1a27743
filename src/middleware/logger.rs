use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use futures::FutureExt;
use tracing::{Instrument, error, info, info_span, warn};

use crate::web::{Context, Handler, Middleware, middleware};

/// Logs each request on entry and completion inside a span carrying the
/// trace id.
pub fn logger() -> Middleware {
    middleware(|next: Handler| -> Handler {
        Arc::new(move |ctx: Context, req: Request| {
            let next = next.clone();
            let method = req.method().clone();
            let path = req.uri().path().to_string();
            let trace_id = ctx
                .values()
                .map(|v| v.trace_id.to_string())
                .unwrap_or_default();
            let span = info_span!("request", trace_id = %trace_id, method = %method, path = %path);

            async move {
                let start = Instant::now();
                info!("request started");

                let result = next(ctx, req).await;

                let status = match &result {
                    Ok(response) => response.status(),
                    Err(err) => err.status(),
                };
                let latency_ms = start.elapsed().as_millis() as u64;

                match status.as_u16() {
                    400..=499 => {
                        warn!(status = status.as_u16(), latency_ms, "request completed")
                    }
                    500..=599 => {
                        error!(status = status.as_u16(), latency_ms, "request completed")
                    }
                    _ => info!(status = status.as_u16(), latency_ms, "request completed"),
                }

                result
            }
            .instrument(span)
            .boxed()
        })
    })
}
