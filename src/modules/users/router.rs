use std::future::Future;
use std::sync::Arc;

use axum::{extract::Request, routing::MethodFilter};
use userhub_auth::{Authenticator, roles};

use crate::middleware::auth::authenticate;
use crate::middleware::role::authorize;
use crate::modules::users::{UserCore, controller};
use crate::web::{App, Context, Handler, HandlerResult, handler};

/// Binds a controller function to its core.
fn bind<F, Fut>(core: &UserCore, f: F) -> Handler
where
    F: Fn(UserCore, Context, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let core = core.clone();
    handler(move |ctx: Context, req: Request| f(core.clone(), ctx, req))
}

/// Registers the user routes under `/{version}/users`.
pub fn init_users_routes(app: &mut App, version: &str, core: &UserCore, auth: Arc<Authenticator>) {
    let authn = authenticate(auth);
    let admin = authorize(&[roles::ADMIN]);

    app.handle(
        MethodFilter::GET,
        version,
        "/users/token",
        bind(core, controller::token),
        &[],
    );
    app.handle(
        MethodFilter::GET,
        version,
        "/users",
        bind(core, controller::query),
        &[authn.clone(), admin.clone()],
    );
    app.handle(
        MethodFilter::POST,
        version,
        "/users",
        bind(core, controller::create),
        &[authn.clone(), admin],
    );
    app.handle(
        MethodFilter::GET,
        version,
        "/users/{id}",
        bind(core, controller::query_by_id),
        &[authn.clone()],
    );
    app.handle(
        MethodFilter::PUT,
        version,
        "/users/{id}",
        bind(core, controller::update),
        &[authn.clone()],
    );
    app.handle(
        MethodFilter::DELETE,
        version,
        "/users/{id}",
        bind(core, controller::delete),
        &[authn],
    );
}
