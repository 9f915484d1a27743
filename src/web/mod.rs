//! A small web framework on top of axum.
//!
//! Handlers receive a [`Context`] alongside the request and return
//! `Result<Response, AppError>`, so failures travel back out through the
//! middleware chain as values instead of being turned into responses at the
//! point they occur.
//!
//! ```text
//! App::handle(GET, "v1", "/users/{id}", handler, &[authenticate])
//!
//!   app middleware ─┐                     ┌─ route middleware ─┐
//!   logger → panics → errors → metrics → authenticate → handler
//! ```
//!
//! Middleware registered first runs first on the way in and last on the way
//! out. App-wide middleware always wraps route-specific middleware.

pub mod context;
pub mod request;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{RawPathParams, Request, rejection::RawPathParamsRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodFilter, on},
};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::error;
use userhub_core::AppError;

pub use context::{Context, Values};
pub use request::{PathParams, param};

pub type HandlerResult = Result<Response, AppError>;

/// Handles a request within a context.
pub type Handler = Arc<dyn Fn(Context, Request) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Wraps a handler to produce a new one.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Lifts an async function into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Context, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Context, req: Request| f(ctx, req).boxed())
}

/// Lifts a closure over handlers into a [`Middleware`].
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Composes `mw` around `handler` so the first entry is the outermost layer.
pub fn wrap_middleware(mw: &[Middleware], handler: Handler) -> Handler {
    mw.iter().rev().fold(handler, |h, m| m(h))
}

/// Writes `data` as JSON with `status`. A 204 carries no body.
pub fn respond<T: Serialize>(status: StatusCode, data: &T) -> HandlerResult {
    if status == StatusCode::NO_CONTENT {
        return Ok(status.into_response());
    }
    Ok((status, Json(data)).into_response())
}

/// Broadcasts a request for the server to stop taking traffic.
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn signal(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_signaled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`Shutdown::signal`] has been called, including before
    /// this future was created.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|signaled| *signaled).await;
    }
}

/// Entrypoint into the application: owns the router, the app-wide middleware,
/// and the shutdown signal raised by integrity failures.
pub struct App {
    router: Router,
    mw: Vec<Middleware>,
    shutdown: Shutdown,
    request_timeout: Option<Duration>,
}

impl App {
    pub fn new(shutdown: Shutdown, mw: Vec<Middleware>) -> Self {
        Self {
            router: Router::new(),
            mw,
            shutdown,
            request_timeout: None,
        }
    }

    /// Every request gets a deadline this far after it arrives.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Registers `handler` for `method` at `/{group}{path}`, wrapped in the
    /// route middleware and then the app middleware.
    pub fn handle(
        &mut self,
        method: MethodFilter,
        group: &str,
        path: &str,
        handler: Handler,
        mw: &[Middleware],
    ) {
        let handler = wrap_middleware(mw, handler);
        let handler = wrap_middleware(&self.mw, handler);

        let shutdown = self.shutdown.clone();
        let request_timeout = self.request_timeout;

        let route = move |params: Result<RawPathParams, RawPathParamsRejection>,
                          mut req: Request| {
            let handler = handler.clone();
            let shutdown = shutdown.clone();
            async move {
                if let Ok(params) = params {
                    req.extensions_mut().insert(PathParams::from(&params));
                }

                // A timeout too large to represent means no deadline.
                let deadline = request_timeout.and_then(|t| Instant::now().checked_add(t));
                let ctx = Context::new(Values::new(), deadline);

                match handler(ctx, req).await {
                    Ok(response) => response,
                    Err(err) => {
                        let err = err.cause();
                        if err.is_shutdown() {
                            error!(error = %err, "integrity failure, signaling shutdown");
                            shutdown.signal();
                        } else {
                            error!(error = %err, "unhandled error escaped the middleware chain");
                        }
                        err.into_response()
                    }
                }
            }
        };

        let full_path = if group.is_empty() {
            path.to_string()
        } else {
            format!("/{}{}", group, path)
        };

        let router = std::mem::take(&mut self.router);
        self.router = router.route(&full_path, on(method, route));
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
