//! Role-based authorization.
//!
//! Runs after [`authenticate`](super::auth::authenticate) and rejects callers
//! whose claims hold none of the required roles.

use std::sync::Arc;

use axum::extract::Request;
use futures::FutureExt;
use tracing::warn;
use userhub_auth::Claims;
use userhub_core::AppError;

use crate::web::{Context, Handler, Middleware, middleware};

pub const NO_CLAIMS: &str = "you are not authorized for that action, no claims";

/// Checks `claims` against `roles`. An empty `roles` list denies everyone.
pub fn check_any_role(claims: Option<&Claims>, roles: &[&str]) -> Result<(), AppError> {
    let claims = claims.ok_or_else(|| AppError::forbidden(NO_CLAIMS))?;

    if !claims.authorized(roles) {
        warn!(subject = %claims.sub, required = ?roles, "insufficient role");
        return Err(AppError::forbidden(format!(
            "you are not authorized for that action, claims[{:?}] roles[{:?}]",
            claims.roles, roles
        )));
    }

    Ok(())
}

/// Lets the request through only if the claims hold one of `roles`.
pub fn authorize(roles: &[&'static str]) -> Middleware {
    let roles: Arc<[&'static str]> = roles.into();

    middleware(move |next: Handler| -> Handler {
        let roles = roles.clone();
        Arc::new(move |ctx: Context, req: Request| {
            let next = next.clone();
            let roles = roles.clone();
            async move {
                check_any_role(ctx.claims(), &roles)?;
                next(ctx, req).await
            }
            .boxed()
        })
    })
}
