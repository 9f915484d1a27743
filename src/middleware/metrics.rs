use std::sync::Arc;

use axum::extract::Request;
use futures::FutureExt;
use metrics::counter;

use crate::web::{Context, Handler, Middleware, middleware};

/// Counts requests and the errors they produce.
pub fn metrics() -> Middleware {
    middleware(|next: Handler| -> Handler {
        Arc::new(move |ctx: Context, req: Request| {
            let next = next.clone();
            let method = req.method().as_str().to_owned();
            async move {
                counter!("http_requests_total", "method" => method.clone()).increment(1);

                let result = next(ctx, req).await;
                if result.is_err() {
                    counter!("http_errors_total", "method" => method).increment(1);
                }
                result
            }
            .boxed()
        })
    })
}
