use std::sync::Arc;

use axum::{extract::Request, http::header};
use futures::FutureExt;
use tracing::warn;
use userhub_auth::Authenticator;
use userhub_core::AppError;

use crate::web::{Context, Handler, Middleware, middleware};

pub const EXPECTED_FORMAT: &str = "expected authorization header format: bearer <token>";

/// Extracts the token from a `bearer <token>` header value. The scheme is
/// case-insensitive and the value must be exactly two space-separated parts.
pub fn bearer_token(value: &str) -> Option<&str> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// Validates the bearer token and puts its claims on the context.
pub fn authenticate(auth: Arc<Authenticator>) -> Middleware {
    middleware(move |next: Handler| -> Handler {
        let auth = auth.clone();
        Arc::new(move |ctx: Context, req: Request| {
            let next = next.clone();
            let auth = auth.clone();
            async move {
                let token = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(bearer_token)
                    .ok_or_else(|| AppError::unauthorized(EXPECTED_FORMAT))?;

                let claims = auth.validate_token(token).map_err(|err| {
                    warn!(
                        trace_id = ?ctx.values().map(|v| v.trace_id),
                        "rejected bearer token"
                    );
                    AppError::from(err)
                })?;

                next(ctx.with_claims(claims), req).await
            }
            .boxed()
        })
    })
}
