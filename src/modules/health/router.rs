use axum::{extract::Request, routing::MethodFilter};

use crate::modules::health::controller;
use crate::modules::users::UserStore;
use crate::web::{App, Context, handler};

pub fn init_health_routes(app: &mut App, version: &str, store: &UserStore) {
    app.handle(
        MethodFilter::GET,
        version,
        "/liveness",
        handler(controller::liveness),
        &[],
    );

    let store = store.clone();
    app.handle(
        MethodFilter::GET,
        version,
        "/readiness",
        handler(move |ctx: Context, req: Request| controller::readiness(store.clone(), ctx, req)),
        &[],
    );
}
